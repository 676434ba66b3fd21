//! Token claims for identity and renewal tokens.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sigil_core::UserClaims;
use std::time::Duration;
use uuid::Uuid;

/// Claims that carry an expiry, in unix seconds.
pub trait ExpiringClaims: Serialize + DeserializeOwned {
    /// Expiry timestamp (`exp`).
    fn expires_at(&self) -> i64;

    /// Whether the claims are expired at `now`. A token is expired from the
    /// second named by `exp` onwards.
    fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at()
    }
}

/// Claims contained in an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Snapshot of the user the token was issued to.
    pub user: UserClaims,

    /// Issued at (unix seconds).
    pub iat: i64,

    /// Expires at (unix seconds).
    pub exp: i64,
}

/// Claims contained in a renewal token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalClaims {
    /// Id of the user that owns the token.
    pub uid: Uuid,

    /// Issued at (unix seconds).
    pub iat: i64,

    /// Expires at (unix seconds).
    pub exp: i64,

    /// Credential id, the key of the token's revocation record.
    pub jti: String,
}

impl IdentityClaims {
    /// Create identity claims issued at `issued_at` and living for `ttl`.
    pub fn new(user: UserClaims, issued_at: i64, ttl: Duration) -> Self {
        Self {
            user,
            iat: issued_at,
            exp: expiry(issued_at, ttl),
        }
    }
}

impl RenewalClaims {
    /// Create renewal claims issued at `issued_at` and living for `ttl`.
    pub fn new(user_id: Uuid, credential_id: Uuid, issued_at: i64, ttl: Duration) -> Self {
        Self {
            uid: user_id,
            iat: issued_at,
            exp: expiry(issued_at, ttl),
            jti: credential_id.to_string(),
        }
    }

    /// Parse the credential id.
    pub fn credential_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.jti).ok()
    }
}

impl ExpiringClaims for IdentityClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl ExpiringClaims for RenewalClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

fn expiry(issued_at: i64, ttl: Duration) -> i64 {
    let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    issued_at.saturating_add(secs)
}
