//! Revocation store contract.
//!
//! A record `(user id, credential id)` exists for every renewal token that is
//! still honorable. Expiry of records is the store's own job.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by revocation stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live record for the given user and credential id.
    #[error("revocation record not found")]
    RecordNotFound,

    /// The ttl cannot be represented by the store.
    #[error("invalid record ttl: {0}")]
    InvalidTtl(String),

    /// The backing store failed or is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Failed to acquire the store lock.
    #[error("failed to acquire store lock")]
    LockError,
}

/// Trait for renewal credential stores.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record a renewal credential as live for `ttl`.
    ///
    /// Once this returns `Ok`, the record is visible to every later call until
    /// the ttl elapses.
    async fn set_record(
        &self,
        user_id: Uuid,
        credential_id: Uuid,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Delete a renewal credential's record.
    ///
    /// Returns [`StoreError::RecordNotFound`] when no live record exists.
    async fn delete_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<(), StoreError>;

    /// Whether a live record exists.
    async fn has_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<bool, StoreError>;

    /// Delete every record of a user, returning how many were live.
    async fn delete_user_records(&self, user_id: Uuid) -> Result<usize, StoreError>;
}
