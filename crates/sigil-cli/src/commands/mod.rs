//! CLI command implementations for Sigil.

pub mod config;
pub mod keys;
pub mod token;

use anyhow::Context;
use sigil_core::SigilConfig;
use std::path::Path;

/// Load and validate a configuration file, resolving key paths relative to it.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<SigilConfig> {
    tracing::debug!(config = %path.display(), "loading configuration");
    SigilConfig::load_with_context(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
