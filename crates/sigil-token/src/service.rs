//! Token service: issuance, validation, rotation and sign-out over one store.

use crate::error::{AuthError, TokenError};
use crate::issuer::{CredentialPair, TokenIssuer};
use crate::keys::{IdentityKeyPair, RenewalSecret};
use crate::store::RevocationStore;
use crate::validator::{RenewalToken, TokenValidator};
use sigil_core::{SigilConfig, UserClaims};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Entry point used by the authentication layer.
///
/// Holds only immutable key material and TTLs besides the store handle, so a
/// single instance can be shared across tasks behind an `Arc`.
pub struct TokenService {
    issuer: TokenIssuer,
    validator: TokenValidator,
    store: Arc<dyn RevocationStore>,
}

impl TokenService {
    /// Create a service from keys, lifetimes and a store.
    pub fn new(
        keys: IdentityKeyPair,
        renewal_secret: RenewalSecret,
        identity_ttl: Duration,
        renewal_ttl: Duration,
        store: Arc<dyn RevocationStore>,
    ) -> Self {
        let issuer = TokenIssuer::new(
            keys.signing_key().clone(),
            renewal_secret.clone(),
            identity_ttl,
            renewal_ttl,
            store.clone(),
        );
        let validator = TokenValidator::new(keys.verifying_key().clone(), renewal_secret);
        Self {
            issuer,
            validator,
            store,
        }
    }

    /// Load keys and lifetimes from configuration.
    pub fn from_config(
        config: &SigilConfig,
        store: Arc<dyn RevocationStore>,
    ) -> Result<Self, TokenError> {
        config.validate()?;
        let keys = IdentityKeyPair::from_config(&config.identity)?;
        let renewal_secret = RenewalSecret::from_config(&config.renewal)?;

        info!(
            algorithm = %config.identity.algorithm,
            identity_ttl_secs = config.identity.ttl_secs,
            renewal_ttl_secs = config.renewal.ttl_secs,
            "token service configured"
        );

        Ok(Self::new(
            keys,
            renewal_secret,
            Duration::from_secs(config.identity.ttl_secs),
            Duration::from_secs(config.renewal.ttl_secs),
            store,
        ))
    }

    /// Get the issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Get the validator.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Issue a fresh pair. See [`TokenIssuer::issue_pair`].
    pub async fn issue_pair(
        &self,
        user: &UserClaims,
        previous_credential_id: Option<Uuid>,
    ) -> Result<CredentialPair, AuthError> {
        self.issuer.issue_pair(user, previous_credential_id).await
    }

    /// See [`TokenValidator::validate_identity_token`].
    pub fn validate_identity_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        self.validator.validate_identity_token(token)
    }

    /// See [`TokenValidator::validate_renewal_token`].
    pub fn validate_renewal_token(&self, token: &str) -> Result<RenewalToken, AuthError> {
        self.validator.validate_renewal_token(token)
    }

    /// Exchange a renewal token for a new pair, revoking the presented one.
    ///
    /// `user` is the current profile of the token's owner, loaded by the
    /// caller. The presented token is rejected if it belongs to someone else
    /// or if its record is no longer in the store.
    pub async fn rotate(
        &self,
        renewal_token: &str,
        user: &UserClaims,
    ) -> Result<CredentialPair, AuthError> {
        let presented = self.validator.validate_renewal_token(renewal_token)?;

        if presented.user_id != user.uid {
            warn!(
                token_user_id = %presented.user_id,
                user_id = %user.uid,
                "renewal token presented for another user"
            );
            return Err(AuthError::renewal_rejected());
        }

        let live = self
            .store
            .has_record(user.uid, presented.credential_id)
            .await
            .map_err(|e| {
                error!(user_id = %user.uid, error = %e, "failed to look up renewal record");
                AuthError::Internal
            })?;
        if !live {
            warn!(
                user_id = %user.uid,
                credential_id = %presented.credential_id,
                "renewal token has been revoked"
            );
            return Err(AuthError::renewal_rejected());
        }

        self.issuer
            .issue_pair(user, Some(presented.credential_id))
            .await
    }

    /// Revoke every renewal credential of a user.
    pub async fn sign_out(&self, user_id: Uuid) -> Result<usize, AuthError> {
        let revoked = self.store.delete_user_records(user_id).await.map_err(|e| {
            error!(%user_id, error = %e, "failed to delete renewal records");
            AuthError::Internal
        })?;
        info!(%user_id, revoked, "signed out");
        Ok(revoked)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
