//! Types shared across the Sigil crates: configuration and the user entity
//! the token engine receives from its callers.

// Configuration types shared across all Sigil crates
pub mod config;
pub mod user;

pub use config::{
    ConfigError, IdentityAlgorithm, IdentityConfig, MAX_TTL_SECS, RenewalConfig, SecretEncoding,
    SigilConfig,
};
pub use user::{User, UserClaims};
