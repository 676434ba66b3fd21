//! Token validation.
//!
//! Validation checks signature and expiry only. It never reads the revocation
//! store: whether a renewal credential has been revoked is checked by the
//! caller (see [`crate::TokenService::rotate`]).

use crate::claims::{IdentityClaims, RenewalClaims};
use crate::error::AuthError;
use crate::keys::{IdentityVerifyingKey, RenewalSecret};
use crate::signer;
use serde::Serialize;
use sigil_core::UserClaims;
use uuid::Uuid;

/// A verified renewal token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalToken {
    /// The compact token as presented or issued.
    pub token: String,
    /// Credential id, the key of the revocation record.
    pub credential_id: Uuid,
    /// Owner of the credential.
    pub user_id: Uuid,
}

/// Verifies identity and renewal tokens.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    verifying_key: IdentityVerifyingKey,
    renewal_secret: RenewalSecret,
}

impl TokenValidator {
    /// Create a validator.
    pub fn new(verifying_key: IdentityVerifyingKey, renewal_secret: RenewalSecret) -> Self {
        Self {
            verifying_key,
            renewal_secret,
        }
    }

    /// Verify an identity token and return the user it was issued to.
    pub fn validate_identity_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        let claims: IdentityClaims = signer::verify(
            token,
            self.verifying_key.algorithm(),
            self.verifying_key.inner(),
        )
        .map_err(|_| AuthError::identity_rejected())?;

        Ok(claims.user)
    }

    /// Verify a renewal token and return its owner and credential id.
    pub fn validate_renewal_token(&self, token: &str) -> Result<RenewalToken, AuthError> {
        let claims: RenewalClaims = signer::verify(
            token,
            self.renewal_secret.algorithm(),
            self.renewal_secret.decoding_key(),
        )
        .map_err(|_| AuthError::renewal_rejected())?;

        let credential_id = claims.credential_id().ok_or_else(|| {
            tracing::debug!(user_id = %claims.uid, "renewal token credential id is not a uuid");
            AuthError::renewal_rejected()
        })?;

        Ok(RenewalToken {
            token: token.to_string(),
            credential_id,
            user_id: claims.uid,
        })
    }
}
