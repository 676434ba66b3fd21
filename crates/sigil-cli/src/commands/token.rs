//! Token commands.
//!
//! `sigil token issue` - Issue a credential pair for a user.
//! `sigil token verify-identity` - Verify an identity token.
//! `sigil token verify-renewal` - Verify a renewal token.
//!
//! Issued pairs are recorded in an in-process store that lives only as long
//! as the command, so `issue` is meant for testing key material and clients.

use super::load_config;
use anyhow::Context;
use sigil_core::SigilConfig;
use sigil_token::{
    CredentialPair, IdentityVerifyingKey, MemoryRevocationStore, RenewalSecret, RenewalToken,
    TokenService, TokenValidator, UserClaims,
};
use std::path::Path;
use std::sync::Arc;

/// Validator built from the public key and renewal secret only.
fn validator(config: &SigilConfig) -> anyhow::Result<TokenValidator> {
    let verifying_key = IdentityVerifyingKey::from_config(&config.identity)
        .context("Failed to load identity public key")?;
    let renewal_secret =
        RenewalSecret::from_config(&config.renewal).context("Failed to load renewal secret")?;
    Ok(TokenValidator::new(verifying_key, renewal_secret))
}

/// Issue a credential pair and print it as JSON.
pub async fn issue(config_path: &Path, user: &UserClaims) -> anyhow::Result<CredentialPair> {
    let config = load_config(config_path)?;
    let service = TokenService::from_config(&config, Arc::new(MemoryRevocationStore::new()))
        .context("Failed to load token keys")?;

    let pair = service.issue_pair(user, None).await?;

    println!("{}", serde_json::to_string_pretty(&pair)?);
    Ok(pair)
}

/// Verify an identity token and print the embedded user.
pub fn verify_identity(config_path: &Path, token: &str) -> anyhow::Result<UserClaims> {
    let config = load_config(config_path)?;
    let user = validator(&config)?.validate_identity_token(token.trim())?;

    println!("✔ Identity token is valid");
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(user)
}

/// Verify a renewal token and print its owner and credential id.
pub fn verify_renewal(config_path: &Path, token: &str) -> anyhow::Result<RenewalToken> {
    let config = load_config(config_path)?;
    let renewal = validator(&config)?.validate_renewal_token(token.trim())?;

    println!("✔ Renewal token is valid");
    println!("  User id:       {}", renewal.user_id);
    println!("  Credential id: {}", renewal.credential_id);
    Ok(renewal)
}
