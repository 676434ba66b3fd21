//! User entity and the snapshot of it that is safe to embed in a bearer token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account as loaded by the profile store.
///
/// The password hash is never serialized. Use [`UserClaims`] for anything that
/// leaves the process inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub website: String,
}

impl User {
    /// Create a user with only an id and email set.
    pub fn new(uid: Uuid, email: impl Into<String>) -> Self {
        Self {
            uid,
            email: email.into(),
            password: String::new(),
            name: String::new(),
            image_url: String::new(),
            website: String::new(),
        }
    }

    /// Snapshot of the fields that may be exposed in an identity token.
    pub fn claims(&self) -> UserClaims {
        UserClaims::from(self)
    }
}

/// User fields carried inside identity tokens.
///
/// Adding a field to [`User`] does not change what tokens carry; fields have to
/// be added here explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    pub uid: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub website: String,
}

impl From<&User> for UserClaims {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid,
            email: user.email.clone(),
            name: user.name.clone(),
            image_url: user.image_url.clone(),
            website: user.website.clone(),
        }
    }
}
