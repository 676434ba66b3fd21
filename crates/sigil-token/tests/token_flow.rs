//! End-to-end tests for issuing, validating and rotating credential pairs.
//!
//! Run with: cargo test --package sigil-token --test token_flow

mod common;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use common::{FaultyStore, RENEWAL_SECRET, service, user};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sigil_token::{AuthError, MemoryRevocationStore, RenewalClaims, RevocationStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use uuid::Uuid;

/// Flip one bit in every byte of the given segment, one token per flip.
fn tampered_variants(token: &str, segment: usize) -> Vec<String> {
    let parts: Vec<&str> = token.split('.').collect();
    let bytes = URL_SAFE_NO_PAD.decode(parts[segment]).unwrap();

    (0..bytes.len())
        .map(|i| {
            let mut flipped = bytes.clone();
            flipped[i] ^= 1 << (i % 8);
            let mut parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
            parts[segment] = URL_SAFE_NO_PAD.encode(&flipped);
            parts.join(".")
        })
        .collect()
}

#[tokio::test]
async fn test_issue_and_validate_pair() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 2_592_000);
    let u1 = user("u1@example.com");

    let pair = service.issue_pair(&u1, None).await.unwrap();

    let validated = service.validate_identity_token(&pair.identity_token).unwrap();
    assert_eq!(validated, u1);

    let renewal = service
        .validate_renewal_token(&pair.renewal_token.token)
        .unwrap();
    assert_eq!(renewal.user_id, u1.uid);
    assert_eq!(renewal.credential_id, pair.renewal_token.credential_id);
    assert_eq!(renewal.token, pair.renewal_token.token);

    assert!(store.has_record(u1.uid, renewal.credential_id).await.unwrap());
}

#[tokio::test]
async fn test_tokens_follow_jwt_conventions() {
    let service = service(Arc::new(MemoryRevocationStore::new()), 900, 3600);
    let u1 = user("u1@example.com");
    let before = Utc::now().timestamp();

    let pair = service.issue_pair(&u1, None).await.unwrap();

    let header = jsonwebtoken::decode_header(&pair.identity_token).unwrap();
    assert_eq!(header.alg, Algorithm::EdDSA);
    assert_eq!(header.typ.as_deref(), Some("JWT"));

    let header = jsonwebtoken::decode_header(&pair.renewal_token.token).unwrap();
    assert_eq!(header.alg, Algorithm::HS256);

    // A plain JWT verifier holding only the secret accepts the renewal token
    let data = jsonwebtoken::decode::<serde_json::Value>(
        &pair.renewal_token.token,
        &DecodingKey::from_secret(RENEWAL_SECRET),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();
    let claims = data.claims;
    assert_eq!(claims["uid"], u1.uid.to_string());
    assert_eq!(claims["jti"], pair.renewal_token.credential_id.to_string());
    let iat = claims["iat"].as_i64().unwrap();
    assert!(iat >= before);
    assert_eq!(claims["exp"].as_i64().unwrap(), iat + 3600);
}

#[tokio::test]
async fn test_identity_token_never_carries_password() {
    let service = service(Arc::new(MemoryRevocationStore::new()), 900, 3600);
    let mut account = sigil_token::User::new(Uuid::new_v4(), "ada@example.com");
    account.password = "$argon2id$hash-that-must-not-leak".to_string();

    let pair = service.issue_pair(&account.claims(), None).await.unwrap();

    let payload = pair.identity_token.split('.').nth(1).unwrap();
    let payload = String::from_utf8(URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    assert!(!payload.contains("password"));
    assert!(!payload.contains("hash-that-must-not-leak"));
}

#[tokio::test]
async fn test_expired_renewal_token_rejected() {
    let service = service(Arc::new(MemoryRevocationStore::new()), 900, 3600);
    let now = Utc::now().timestamp();
    let claims = RenewalClaims {
        uid: Uuid::new_v4(),
        iat: now - 3600,
        exp: now - 1,
        jti: Uuid::new_v4().to_string(),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(RENEWAL_SECRET),
    )
    .unwrap();

    assert_eq!(
        service.validate_renewal_token(&token),
        Err(AuthError::renewal_rejected())
    );
}

#[tokio::test]
async fn test_expired_identity_token_rejected() {
    let store = Arc::new(MemoryRevocationStore::new());
    // Lifetime of zero: expired the moment it is minted
    let service = service(store, 0, 3600);

    let pair = service.issue_pair(&user("u1@example.com"), None).await.unwrap();

    assert_eq!(
        service.validate_identity_token(&pair.identity_token),
        Err(AuthError::identity_rejected())
    );
}

#[tokio::test]
async fn test_tampered_tokens_rejected() {
    let service = service(Arc::new(MemoryRevocationStore::new()), 900, 3600);
    let pair = service.issue_pair(&user("u1@example.com"), None).await.unwrap();

    for segment in [1, 2] {
        for token in tampered_variants(&pair.identity_token, segment) {
            assert_eq!(
                service.validate_identity_token(&token),
                Err(AuthError::identity_rejected())
            );
        }
        for token in tampered_variants(&pair.renewal_token.token, segment) {
            assert_eq!(
                service.validate_renewal_token(&token),
                Err(AuthError::renewal_rejected())
            );
        }
    }
}

#[tokio::test]
async fn test_rejections_are_uniform() {
    let service = service(Arc::new(MemoryRevocationStore::new()), 900, 3600);
    let pair = service.issue_pair(&user("u1@example.com"), None).await.unwrap();
    let mut tampered = tampered_variants(&pair.identity_token, 2);

    let malformed = service.validate_identity_token("not-a-token").unwrap_err();
    let bad_signature = service
        .validate_identity_token(&tampered.remove(0))
        .unwrap_err();
    let wrong_kind = service
        .validate_identity_token(&pair.renewal_token.token)
        .unwrap_err();

    assert_eq!(malformed, bad_signature);
    assert_eq!(bad_signature, wrong_kind);
    assert_eq!(malformed.to_string(), bad_signature.to_string());
}

#[tokio::test]
async fn test_credential_ids_are_unique() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let mut ids = HashSet::new();
    for _ in 0..10_000 {
        let pair = service.issue_pair(&u1, None).await.unwrap();
        assert!(ids.insert(pair.renewal_token.credential_id));
    }

    assert_eq!(ids.len(), 10_000);
    assert_eq!(store.credential_ids(u1.uid).unwrap().len(), 10_000);
}

#[tokio::test]
async fn test_rotation_revokes_previous_record() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let first = service.issue_pair(&u1, None).await.unwrap();
    let old_id = first.renewal_token.credential_id;

    let second = service.issue_pair(&u1, Some(old_id)).await.unwrap();
    let new_id = second.renewal_token.credential_id;

    assert_ne!(old_id, new_id);
    assert!(!store.has_record(u1.uid, old_id).await.unwrap());
    assert!(store.has_record(u1.uid, new_id).await.unwrap());
}

#[tokio::test]
async fn test_rotation_survives_delete_fault() {
    let store = Arc::new(FaultyStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let first = service.issue_pair(&u1, None).await.unwrap();
    store.fail_delete(true);

    let second = service
        .issue_pair(&u1, Some(first.renewal_token.credential_id))
        .await
        .unwrap();

    assert_eq!(store.delete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        service.validate_identity_token(&second.identity_token),
        Ok(u1.clone())
    );
    let renewal = service
        .validate_renewal_token(&second.renewal_token.token)
        .unwrap();
    assert!(
        store
            .has_record(u1.uid, renewal.credential_id)
            .await
            .unwrap()
    );
    // The old record is still there; the fault was swallowed
    assert!(
        store
            .has_record(u1.uid, first.renewal_token.credential_id)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_issuance_fails_atomically_on_write_fault() {
    let store = Arc::new(FaultyStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let first = service.issue_pair(&u1, None).await.unwrap();
    store.fail_set(true);

    let result = service
        .issue_pair(&u1, Some(first.renewal_token.credential_id))
        .await;

    assert!(matches!(result, Err(AuthError::Internal)));
    assert_eq!(
        store.inner.credential_ids(u1.uid).unwrap(),
        vec![first.renewal_token.credential_id]
    );
    // The previous record is untouched when issuance fails
    assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_previous_id_of_another_user_is_not_revoked() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let (alice, mallory) = (user("alice@example.com"), user("mallory@example.com"));

    let alice_pair = service.issue_pair(&alice, None).await.unwrap();
    let alice_id = alice_pair.renewal_token.credential_id;

    service.issue_pair(&mallory, Some(alice_id)).await.unwrap();

    assert!(store.has_record(alice.uid, alice_id).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_issuance_for_one_user() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = Arc::new(service(store.clone(), 900, 3600));
    let u1 = user("u1@example.com");

    let mut handles = Vec::new();
    for _ in 0..32 {
        let service = service.clone();
        let u1 = u1.clone();
        handles.push(tokio::spawn(async move {
            service.issue_pair(&u1, None).await.unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let pair = handle.await.unwrap();
        assert!(service.validate_identity_token(&pair.identity_token).is_ok());
        ids.insert(pair.renewal_token.credential_id);
    }

    assert_eq!(ids.len(), 32);
    assert_eq!(store.credential_ids(u1.uid).unwrap().len(), 32);
}

#[tokio::test]
async fn test_rotate_with_live_renewal_token() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let first = service.issue_pair(&u1, None).await.unwrap();
    let second = service
        .rotate(&first.renewal_token.token, &u1)
        .await
        .unwrap();

    assert_eq!(
        store.credential_ids(u1.uid).unwrap(),
        vec![second.renewal_token.credential_id]
    );

    // The rotated-out token still verifies but is no longer honored
    assert!(
        service
            .validate_renewal_token(&first.renewal_token.token)
            .is_ok()
    );
    assert_eq!(
        service
            .rotate(&first.renewal_token.token, &u1)
            .await
            .unwrap_err(),
        AuthError::renewal_rejected()
    );
}

#[tokio::test]
async fn test_rotate_rejects_token_of_another_user() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let (alice, mallory) = (user("alice@example.com"), user("mallory@example.com"));

    let alice_pair = service.issue_pair(&alice, None).await.unwrap();

    let result = service.rotate(&alice_pair.renewal_token.token, &mallory).await;

    assert_eq!(result.unwrap_err(), AuthError::renewal_rejected());
    assert!(
        store
            .has_record(alice.uid, alice_pair.renewal_token.credential_id)
            .await
            .unwrap()
    );
    assert!(store.credential_ids(mallory.uid).unwrap().is_empty());
}

#[tokio::test]
async fn test_rotate_store_read_fault_is_internal() {
    let store = Arc::new(FaultyStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let pair = service.issue_pair(&u1, None).await.unwrap();
    store.fail_has(true);

    let result = service.rotate(&pair.renewal_token.token, &u1).await;
    assert_eq!(result.unwrap_err(), AuthError::Internal);
}

#[tokio::test]
async fn test_sign_out_revokes_every_credential() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    let pairs = [
        service.issue_pair(&u1, None).await.unwrap(),
        service.issue_pair(&u1, None).await.unwrap(),
    ];

    assert_eq!(service.sign_out(u1.uid).await.unwrap(), 2);
    for pair in &pairs {
        assert_eq!(
            service.rotate(&pair.renewal_token.token, &u1).await.unwrap_err(),
            AuthError::renewal_rejected()
        );
    }
    assert_eq!(service.sign_out(u1.uid).await.unwrap(), 0);
}

#[tokio::test]
async fn test_abandoned_issuance_leaves_no_record() {
    let store = Arc::new(MemoryRevocationStore::new());
    let service = service(store.clone(), 900, 3600);
    let u1 = user("u1@example.com");

    // Dropping the future before it is polled must not touch the store
    let future = service.issue_pair(&u1, None);
    drop(future);

    assert!(store.is_empty().unwrap());
}
