//! Renewal token signing configuration.

use super::ConfigError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the renewal secret is written in its source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// The secret bytes are the UTF-8 string itself.
    #[default]
    Plain,
    /// The secret is standard base64.
    Base64,
}

/// Configuration for renewal token signing and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalConfig {
    /// Environment variable containing the shared secret.
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Path to a file containing the shared secret.
    #[serde(default)]
    pub secret_file: Option<PathBuf>,

    /// Encoding of the secret in its source.
    #[serde(default)]
    pub encoding: SecretEncoding,

    /// Renewal token lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            secret_env: None,
            secret_file: None,
            encoding: SecretEncoding::default(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl RenewalConfig {
    /// Resolve the secret bytes from environment or file.
    pub fn resolve_secret(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut raw = None;

        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                raw = Some(secret);
            }
        }

        if raw.is_none() {
            if let Some(path) = &self.secret_file {
                if path.exists() {
                    raw = Some(std::fs::read_to_string(path)?);
                }
            }
        }

        let Some(raw) = raw else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::Config("renewal secret is empty".to_string()));
        }

        match self.encoding {
            SecretEncoding::Plain => Ok(Some(raw.as_bytes().to_vec())),
            SecretEncoding::Base64 => STANDARD
                .decode(raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidSecret(e.to_string())),
        }
    }
}

fn default_ttl_secs() -> u64 {
    // Three days
    259_200
}
