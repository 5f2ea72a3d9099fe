//! User model and related functionality

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current session token, if one was ever issued
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Snapshot of the public identity fields, as stored in the user cookie
    pub fn cached(&self) -> CachedUser {
        CachedUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Display copy of a user carried in the `user_cache` cookie.
///
/// Trusted but possibly stale: it is never consulted for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CachedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}
