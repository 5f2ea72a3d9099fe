//! Session and user-cache cookies
//!
//! Both cookies are always written together with one absolute expiry so the
//! cached snapshot never outlives the token it describes.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::error::{ForumError, ForumResult};
use crate::models::CachedUser;

/// Cookie carrying the opaque session token
pub const SESSION_COOKIE: &str = "session_token";
/// Cookie carrying the JSON user snapshot
pub const USER_COOKIE: &str = "user_cache";

/// Attributes shared by both cookies
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub ttl: Duration,
    /// Secure-only; enable in production behind TLS
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
            secure: false,
        }
    }
}

impl CookiePolicy {
    /// Add the session and user cookies, expiring `ttl` from `issued_at`
    pub fn attach(
        &self,
        jar: CookieJar,
        token: &str,
        user: &CachedUser,
        issued_at: OffsetDateTime,
    ) -> ForumResult<CookieJar> {
        let snapshot = serde_json::to_string(user)
            .map_err(|e| ForumError::Validation(format!("Unserializable user snapshot: {}", e)))?;
        let expires = issued_at + self.ttl;

        Ok(jar
            .add(self.build(SESSION_COOKIE, token.to_string(), expires))
            .add(self.build(USER_COOKIE, snapshot, expires)))
    }

    fn build(&self, name: &'static str, value: String, expires: OffsetDateTime) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .expires(expires)
            .build()
    }
}

/// Session token from the request cookies, if present and non-empty
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Cached user snapshot from the request cookies.
///
/// An unreadable snapshot is treated as absent.
pub fn cached_user(jar: &CookieJar) -> Option<CachedUser> {
    let cookie = jar.get(USER_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Ignoring unreadable user cookie: {}", e);
            None
        }
    }
}
