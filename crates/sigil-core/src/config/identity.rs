//! Identity token signing configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Asymmetric algorithm used to sign identity tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum IdentityAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RS256,
    /// ECDSA on P-256 with SHA-256.
    ES256,
    /// Ed25519.
    #[default]
    EdDSA,
}

impl std::fmt::Display for IdentityAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityAlgorithm::RS256 => write!(f, "RS256"),
            IdentityAlgorithm::ES256 => write!(f, "ES256"),
            IdentityAlgorithm::EdDSA => write!(f, "EdDSA"),
        }
    }
}

/// Configuration for identity token signing and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Signing algorithm; must match the key material.
    #[serde(default)]
    pub algorithm: IdentityAlgorithm,

    /// Environment variable containing the PEM-encoded private key.
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the PEM-encoded private key.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Environment variable containing the PEM-encoded public key.
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to the PEM-encoded public key.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,

    /// Identity token lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            algorithm: IdentityAlgorithm::default(),
            private_key_env: None,
            private_key_file: None,
            public_key_env: None,
            public_key_file: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl IdentityConfig {
    /// Resolve the private key PEM from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(self.private_key_env.as_deref(), self.private_key_file.as_ref())
    }

    /// Resolve the public key PEM from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }
}

fn resolve_pem(
    env_var: Option<&str>,
    path: Option<&PathBuf>,
) -> Result<Option<String>, std::io::Error> {
    // Environment wins over the file
    if let Some(env_var) = env_var {
        if let Ok(pem) = std::env::var(env_var) {
            return Ok(Some(pem));
        }
    }

    if let Some(path) = path {
        if path.exists() {
            return Ok(Some(std::fs::read_to_string(path)?));
        }
    }

    Ok(None)
}

fn default_ttl_secs() -> u64 {
    900
}
