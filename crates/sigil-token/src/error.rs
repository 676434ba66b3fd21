//! Error types for the token crate.

use thiserror::Error;

/// Message returned for every rejected identity token.
pub const IDENTITY_TOKEN_REJECTED: &str = "unable to verify user from identity token";

/// Message returned for every rejected renewal token.
pub const RENEWAL_TOKEN_REJECTED: &str = "unable to verify user from renewal token";

/// Errors from key handling, signing and verification.
///
/// These stay inside the engine. Callers of [`crate::TokenService`] only ever
/// see [`AuthError`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// Failed to generate a key or secret.
    #[error("failed to generate key: {0}")]
    KeyGenerationFailed(String),

    /// Failed to parse a private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse a public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// A key or secret was not configured.
    #[error("missing key material: {0}")]
    MissingKey(String),

    /// Failed to sign claims.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),

    /// The token failed verification. Deliberately carries no cause.
    #[error("invalid token")]
    InvalidToken,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] sigil_core::ConfigError),
}

/// Errors surfaced to callers of the issuance and validation engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Issuance could not complete. No key or store detail is included.
    #[error("internal server error")]
    Internal,

    /// The presented credential is not trusted. The message is the same for
    /// every cause.
    #[error("authorization failed: {0}")]
    Authorization(&'static str),
}

impl AuthError {
    /// Uniform rejection for identity tokens.
    pub fn identity_rejected() -> Self {
        AuthError::Authorization(IDENTITY_TOKEN_REJECTED)
    }

    /// Uniform rejection for renewal tokens.
    pub fn renewal_rejected() -> Self {
        AuthError::Authorization(RENEWAL_TOKEN_REJECTED)
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Internal => 500,
            AuthError::Authorization(_) => 401,
        }
    }
}
