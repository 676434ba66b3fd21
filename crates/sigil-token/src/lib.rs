//! # sigil-token
//!
//! Paired credential issuance and validation for Sigil.
//!
//! This crate provides functionality for:
//! - Loading and generating identity signing keys (RS256, ES256, EdDSA)
//! - Minting identity and renewal tokens as standard JWTs
//! - Validating presented tokens into a trusted principal
//! - Recording, rotating and revoking renewal credentials in a store
//!
//! ## Two-Token Model
//!
//! | Token Type | Signed With | Contains | Lifetime | Revocable |
//! |------------|-------------|----------|----------|-----------|
//! | **Identity Token** | Asymmetric private key | User snapshot | Short | No |
//! | **Renewal Token** | Shared secret (HS256) | User id, credential id | Long | Yes |
//!
//! Every issued renewal token has a revocation record in a [`RevocationStore`].
//! Issuing a new pair with the previous credential id deletes the previous
//! record, which is how rotation invalidates the renewal token that was used.

pub mod claims;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod memory;
pub mod service;
pub mod signer;
pub mod store;
pub mod validator;

pub use claims::{IdentityClaims, RenewalClaims};
pub use error::{AuthError, TokenError};
pub use issuer::{CredentialPair, TokenIssuer};
pub use keys::{
    GeneratedKeyPair, IdentityKeyPair, IdentitySigningKey, IdentityVerifyingKey, RenewalSecret,
};
pub use memory::MemoryRevocationStore;
pub use service::TokenService;
pub use store::{RevocationStore, StoreError};
pub use validator::{RenewalToken, TokenValidator};

pub use sigil_core::{User, UserClaims};
