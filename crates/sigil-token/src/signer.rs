//! JWT signing and verification.
//!
//! Tokens are standard three-part JWTs. Verification fails on a bad
//! signature, a malformed token or claims that do not match the expected
//! shape, and on expiry. All of these come back as
//! [`TokenError::InvalidToken`]; the underlying cause is only logged.

use crate::claims::ExpiringClaims;
use crate::error::TokenError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Sign claims into a compact token.
pub fn sign<C: ExpiringClaims>(
    claims: &C,
    algorithm: Algorithm,
    key: &EncodingKey,
) -> Result<String, TokenError> {
    let header = Header::new(algorithm);
    jsonwebtoken::encode(&header, claims, key).map_err(|e| TokenError::SigningFailed(e.to_string()))
}

/// Verify a compact token and decode its claims.
pub fn verify<C: ExpiringClaims>(
    token: &str,
    algorithm: Algorithm,
    key: &DecodingKey,
) -> Result<C, TokenError> {
    let data = jsonwebtoken::decode::<C>(token, key, &validation(algorithm)).map_err(|e| {
        tracing::debug!(kind = ?e.kind(), "token verification failed");
        TokenError::InvalidToken
    })?;

    // jsonwebtoken still accepts a token in the second named by `exp`
    if data.claims.is_expired_at(Utc::now().timestamp()) {
        tracing::debug!("token verification failed: expired");
        return Err(TokenError::InvalidToken);
    }

    Ok(data.claims)
}

fn validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "iat"]);
    validation
}
