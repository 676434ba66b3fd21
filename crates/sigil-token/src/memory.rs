//! In-process revocation store.

use crate::store::{RevocationStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Map size below which writes never sweep expired records.
const SWEEP_MIN_RECORDS: usize = 1024;

/// Keyed TTL map of renewal credential records.
///
/// Expired entries are invisible to every operation. They are dropped by
/// [`MemoryRevocationStore::purge_expired`], and by a write once the map has
/// doubled in size since the last sweep.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    records: RwLock<HashMap<(Uuid, Uuid), DateTime<Utc>>>,
    /// Map size at which the next write sweeps. Only touched under the write lock.
    sweep_at: AtomicUsize,
}

impl MemoryRevocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired records, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().map_err(|_| StoreError::LockError)?;
        let before = records.len();
        records.retain(|_, expires_at| *expires_at > now);
        Ok(before - records.len())
    }

    /// Number of live records.
    pub fn len(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let records = self.records.read().map_err(|_| StoreError::LockError)?;
        Ok(records.values().filter(|expires_at| **expires_at > now).count())
    }

    /// Whether the store holds no live records.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Live credential ids of a user.
    pub fn credential_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let now = Utc::now();
        let records = self.records.read().map_err(|_| StoreError::LockError)?;
        Ok(records
            .iter()
            .filter(|((uid, _), expires_at)| *uid == user_id && **expires_at > now)
            .map(|((_, credential_id), _)| *credential_id)
            .collect())
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn set_record(
        &self,
        user_id: Uuid,
        credential_id: Uuid,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let ttl =
            chrono::Duration::from_std(ttl).map_err(|e| StoreError::InvalidTtl(e.to_string()))?;
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| StoreError::InvalidTtl("ttl overflows the clock".to_string()))?;

        let mut records = self.records.write().map_err(|_| StoreError::LockError)?;
        if records.len() >= self.sweep_at.load(Ordering::Relaxed).max(SWEEP_MIN_RECORDS) {
            records.retain(|_, expires_at| *expires_at > now);
            self.sweep_at.store(records.len() * 2, Ordering::Relaxed);
        }
        records.insert((user_id, credential_id), expires_at);

        tracing::debug!(%user_id, %credential_id, "stored renewal record");
        Ok(())
    }

    async fn delete_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockError)?;
        match records.remove(&(user_id, credential_id)) {
            Some(expires_at) if expires_at > Utc::now() => Ok(()),
            _ => Err(StoreError::RecordNotFound),
        }
    }

    async fn has_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<bool, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockError)?;
        Ok(records
            .get(&(user_id, credential_id))
            .is_some_and(|expires_at| *expires_at > Utc::now()))
    }

    async fn delete_user_records(&self, user_id: Uuid) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().map_err(|_| StoreError::LockError)?;
        let mut live = 0;
        records.retain(|(uid, _), expires_at| {
            if *uid != user_id {
                return true;
            }
            if *expires_at > now {
                live += 1;
            }
            false
        });
        Ok(live)
    }
}
