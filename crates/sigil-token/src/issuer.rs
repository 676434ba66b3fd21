//! Credential pair issuance.

use crate::claims::{IdentityClaims, RenewalClaims};
use crate::error::AuthError;
use crate::keys::{IdentitySigningKey, RenewalSecret};
use crate::signer;
use crate::store::{RevocationStore, StoreError};
use crate::validator::RenewalToken;
use chrono::Utc;
use serde::Serialize;
use sigil_core::UserClaims;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Identity and renewal tokens issued together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Signed identity token.
    pub identity_token: String,
    /// Signed renewal token with its credential id.
    pub renewal_token: RenewalToken,
    /// Lifetime of the renewal token's record.
    #[serde(skip)]
    pub renewal_expires_in: Duration,
}

/// Mints credential pairs and records renewal credentials.
pub struct TokenIssuer {
    signing_key: IdentitySigningKey,
    renewal_secret: RenewalSecret,
    identity_ttl: Duration,
    renewal_ttl: Duration,
    store: Arc<dyn RevocationStore>,
}

impl TokenIssuer {
    /// Create an issuer.
    pub fn new(
        signing_key: IdentitySigningKey,
        renewal_secret: RenewalSecret,
        identity_ttl: Duration,
        renewal_ttl: Duration,
        store: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            signing_key,
            renewal_secret,
            identity_ttl,
            renewal_ttl,
            store,
        }
    }

    /// Identity token lifetime.
    pub fn identity_ttl(&self) -> Duration {
        self.identity_ttl
    }

    /// Renewal token lifetime.
    pub fn renewal_ttl(&self) -> Duration {
        self.renewal_ttl
    }

    /// Issue a fresh credential pair for `user`.
    ///
    /// The renewal credential is recorded in the store before the pair is
    /// returned; if that write fails nothing is returned. When
    /// `previous_credential_id` is given, that credential's record for this
    /// user is deleted afterwards on a best-effort basis: failing to delete it
    /// is logged and does not fail the call.
    pub async fn issue_pair(
        &self,
        user: &UserClaims,
        previous_credential_id: Option<Uuid>,
    ) -> Result<CredentialPair, AuthError> {
        let issued_at = Utc::now().timestamp();

        let identity_claims = IdentityClaims::new(user.clone(), issued_at, self.identity_ttl);
        let identity_token = signer::sign(
            &identity_claims,
            self.signing_key.algorithm(),
            self.signing_key.inner(),
        )
        .map_err(|e| {
            error!(user_id = %user.uid, error = %e, "failed to sign identity token");
            AuthError::Internal
        })?;

        let credential_id = Uuid::new_v4();
        let renewal_claims =
            RenewalClaims::new(user.uid, credential_id, issued_at, self.renewal_ttl);
        let renewal_token = signer::sign(
            &renewal_claims,
            self.renewal_secret.algorithm(),
            self.renewal_secret.encoding_key(),
        )
        .map_err(|e| {
            error!(user_id = %user.uid, error = %e, "failed to sign renewal token");
            AuthError::Internal
        })?;

        self.store
            .set_record(user.uid, credential_id, self.renewal_ttl)
            .await
            .map_err(|e| {
                error!(user_id = %user.uid, error = %e, "failed to store renewal record");
                AuthError::Internal
            })?;

        if let Some(previous) = previous_credential_id {
            self.revoke_previous(user.uid, previous).await;
        }

        debug!(user_id = %user.uid, %credential_id, "issued credential pair");

        Ok(CredentialPair {
            identity_token,
            renewal_token: RenewalToken {
                token: renewal_token,
                credential_id,
                user_id: user.uid,
            },
            renewal_expires_in: self.renewal_ttl,
        })
    }

    async fn revoke_previous(&self, user_id: Uuid, credential_id: Uuid) {
        match self.store.delete_record(user_id, credential_id).await {
            Ok(()) => debug!(%user_id, %credential_id, "revoked previous renewal record"),
            Err(StoreError::RecordNotFound) => {
                debug!(%user_id, %credential_id, "previous renewal record already gone")
            }
            Err(e) => warn!(
                %user_id,
                %credential_id,
                error = %e,
                "could not delete previous renewal record"
            ),
        }
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.signing_key.algorithm())
            .field("identity_ttl", &self.identity_ttl)
            .field("renewal_ttl", &self.renewal_ttl)
            .finish_non_exhaustive()
    }
}
