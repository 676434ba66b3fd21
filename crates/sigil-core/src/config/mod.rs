//! Configuration types for Sigil.
//!
//! Configuration is loaded once from a YAML file (usually `sigil.yaml`) and
//! treated as immutable afterwards. Key material is never stored inline: each
//! key or secret names an environment variable and/or a file, and the
//! environment variable wins when both are set.
//!
//! ```yaml
//! identity:
//!   algorithm: EdDSA
//!   private_key_file: keys/identity.pem
//!   public_key_file: keys/identity.pub.pem
//!   ttl_secs: 900
//! renewal:
//!   secret_env: SIGIL_RENEWAL_SECRET
//!   encoding: base64
//!   ttl_secs: 259200
//! ```

pub mod identity;
pub mod renewal;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use identity::{IdentityAlgorithm, IdentityConfig};
pub use renewal::{RenewalConfig, SecretEncoding};

/// Longest accepted token lifetime: ten years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Complete Sigil configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigilConfig {
    /// Identity token settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Renewal token settings.
    #[serde(default)]
    pub renewal: RenewalConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid renewal secret: {0}")]
    InvalidSecret(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SigilConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration, resolve relative key paths against the directory of
    /// the config file, and validate it.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        for file in [
            &mut config.identity.private_key_file,
            &mut config.identity.public_key_file,
            &mut config.renewal.secret_file,
        ]
        .into_iter()
        .flatten()
        {
            if file.is_relative() {
                *file = base_dir.join(&*file);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check lifetimes for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, ttl_secs) in [
            ("identity.ttl_secs", self.identity.ttl_secs),
            ("renewal.ttl_secs", self.renewal.ttl_secs),
        ] {
            if ttl_secs == 0 {
                return Err(ConfigError::Config(format!("{field} must be greater than zero")));
            }
            if ttl_secs > MAX_TTL_SECS {
                return Err(ConfigError::Config(format!(
                    "{field} ({ttl_secs}) exceeds the maximum of {MAX_TTL_SECS}"
                )));
            }
        }
        if self.renewal.ttl_secs < self.identity.ttl_secs {
            return Err(ConfigError::Config(format!(
                "renewal.ttl_secs ({}) must not be shorter than identity.ttl_secs ({})",
                self.renewal.ttl_secs, self.identity.ttl_secs
            )));
        }
        Ok(())
    }
}
