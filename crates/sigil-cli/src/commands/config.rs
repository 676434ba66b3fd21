//! `sigil config check` command implementation.

use super::load_config;
use anyhow::Context;
use sigil_token::{IdentityKeyPair, RenewalSecret};
use std::path::Path;

/// Load the configuration and every key it references.
pub fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    println!("✔ Configuration: {}", config_path.display());

    IdentityKeyPair::from_config(&config.identity).context("Identity key pair is not usable")?;
    println!(
        "✔ Identity key pair ({}), lifetime {}s",
        config.identity.algorithm, config.identity.ttl_secs
    );

    RenewalSecret::from_config(&config.renewal).context("Renewal secret is not usable")?;
    println!("✔ Renewal secret, lifetime {}s", config.renewal.ttl_secs);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::write_config;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_check_valid_config() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path());
        check(&config).unwrap();
    }

    #[test]
    fn test_check_missing_secret() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path());
        fs::remove_file(dir.path().join("renewal.secret")).unwrap();

        let err = check(&config).unwrap_err();
        assert!(err.to_string().contains("Renewal secret"));
    }

    #[test]
    fn test_check_rejects_inverted_lifetimes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sigil.yaml");
        fs::write(
            &path,
            "identity:\n  ttl_secs: 3600\nrenewal:\n  ttl_secs: 60\n",
        )
        .unwrap();

        assert!(check(&path).is_err());
    }
}
