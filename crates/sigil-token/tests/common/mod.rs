//! Shared helpers for token integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sigil_token::{
    GeneratedKeyPair, MemoryRevocationStore, RenewalSecret, RevocationStore, StoreError,
    TokenService, UserClaims,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub const RENEWAL_SECRET: &[u8] = b"integration-test-renewal-secret";

/// Store wrapper that fails selected operations on demand.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryRevocationStore,
    pub fail_set: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_has: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_has(&self, fail: bool) {
        self.fail_has.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RevocationStore for FaultyStore {
    async fn set_record(
        &self,
        user_id: Uuid,
        credential_id: Uuid,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write fault".to_string()));
        }
        self.inner.set_record(user_id, credential_id, ttl).await
    }

    async fn delete_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated delete fault".to_string()));
        }
        self.inner.delete_record(user_id, credential_id).await
    }

    async fn has_record(&self, user_id: Uuid, credential_id: Uuid) -> Result<bool, StoreError> {
        if self.fail_has.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated read fault".to_string()));
        }
        self.inner.has_record(user_id, credential_id).await
    }

    async fn delete_user_records(&self, user_id: Uuid) -> Result<usize, StoreError> {
        self.inner.delete_user_records(user_id).await
    }
}

pub fn user(email: &str) -> UserClaims {
    UserClaims {
        uid: Uuid::new_v4(),
        email: email.to_string(),
        name: "Test User".to_string(),
        image_url: "https://cdn.example.com/avatar.png".to_string(),
        website: "https://example.com".to_string(),
    }
}

/// Service with a fresh Ed25519 key pair.
pub fn service(
    store: Arc<dyn RevocationStore>,
    identity_ttl_secs: u64,
    renewal_ttl_secs: u64,
) -> TokenService {
    let keys = GeneratedKeyPair::ed25519().unwrap().key_pair();
    TokenService::new(
        keys,
        RenewalSecret::new(RENEWAL_SECRET).unwrap(),
        Duration::from_secs(identity_ttl_secs),
        Duration::from_secs(renewal_ttl_secs),
        store,
    )
}
