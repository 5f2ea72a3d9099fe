//! Session registry backed by the `users.session_token` column
//!
//! A user moves from no session to an active one the first time a token is
//! issued and then keeps that token: there is no logout and no server-side
//! expiry. Tokens die with the cookies that carry them.

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ForumError, ForumResult};
use crate::models::CachedUser;
use crate::repositories::UserRepository;

/// Authenticated request context.
///
/// `user_id` comes from validating the session token and is the only field
/// authorization may use. `cached` is the display snapshot read back from
/// the user cookie; it can be stale and is never re-checked against the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub user_id: i64,
    pub cached: Option<CachedUser>,
}

/// Session registry
#[derive(Clone)]
pub struct SessionRegistry {
    users: UserRepository,
}

impl SessionRegistry {
    /// Create a new session registry
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Generate a fresh opaque token with 122 bits of randomness
    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Issue a new token for a user and persist it on the user record
    pub async fn issue(&self, user_id: i64) -> ForumResult<String> {
        info!("Issuing session for user: {}", user_id);

        let token = Self::new_token();
        if !self.users.set_session_token(user_id, &token).await? {
            return Err(ForumError::Validation(format!(
                "User {} does not exist",
                user_id
            )));
        }

        Ok(token)
    }

    /// Keep a user's current token, issuing one only when none is held
    pub async fn ensure(&self, user_id: i64, existing_token: Option<&str>) -> ForumResult<String> {
        match existing_token {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => self.issue(user_id).await,
        }
    }

    /// Resolve a token to the id of the user holding it
    pub async fn validate(&self, token: &str) -> ForumResult<i64> {
        if token.is_empty() {
            return Err(invalid_session());
        }

        self.users
            .find_id_by_session_token(token)
            .await?
            .ok_or_else(invalid_session)
    }

    /// Validate a token and attach the cookie snapshot, if one came along
    pub async fn authenticate(
        &self,
        token: &str,
        cached: Option<CachedUser>,
    ) -> ForumResult<SessionContext> {
        let user_id = self.validate(token).await?;

        let cached = match cached {
            Some(snapshot) if snapshot.id != user_id => {
                warn!(
                    "User cookie for user {} does not match session owner {}; ignoring it",
                    snapshot.id, user_id
                );
                None
            }
            other => other,
        };

        Ok(SessionContext {
            token: token.to_string(),
            user_id,
            cached,
        })
    }

    /// Fresh snapshot of the token owner for the user cookie
    pub async fn snapshot(&self, token: &str) -> ForumResult<CachedUser> {
        self.users
            .find_cached_by_session_token(token)
            .await?
            .ok_or_else(invalid_session)
    }
}

fn invalid_session() -> ForumError {
    ForumError::Auth("Invalid session".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, migrated_pool};

    #[tokio::test]
    async fn test_ensure_issues_when_empty() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool.clone());
        let uid = insert_user(&pool, "joon", "joon@x.com").await;

        for empty in [None, Some("")] {
            let token = registry.ensure(uid, empty).await.unwrap();
            assert!(!token.is_empty());
            assert_eq!(registry.validate(&token).await.unwrap(), uid);
        }
    }

    #[tokio::test]
    async fn test_ensure_keeps_existing_token() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool.clone());
        let uid = insert_user(&pool, "joon", "joon@x.com").await;

        let issued = registry.issue(uid).await.unwrap();
        let kept = registry.ensure(uid, Some(&issued)).await.unwrap();
        assert_eq!(kept, issued);

        let arbitrary = registry.ensure(uid, Some("opaque-value")).await.unwrap();
        assert_eq!(arbitrary, "opaque-value");
    }

    #[tokio::test]
    async fn test_reissue_replaces_token() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool.clone());
        let uid = insert_user(&pool, "joon", "joon@x.com").await;

        let first = registry.issue(uid).await.unwrap();
        let second = registry.issue(uid).await.unwrap();

        assert_ne!(first, second);
        assert!(matches!(
            registry.validate(&first).await,
            Err(ForumError::Auth(_))
        ));
        assert_eq!(registry.validate(&second).await.unwrap(), uid);
    }

    #[tokio::test]
    async fn test_validate_unknown_and_empty() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool);

        assert!(matches!(
            registry.validate("never-issued").await,
            Err(ForumError::Auth(_))
        ));
        assert!(matches!(registry.validate("").await, Err(ForumError::Auth(_))));
    }

    #[tokio::test]
    async fn test_issue_for_missing_user() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool);

        assert!(matches!(
            registry.issue(4242).await,
            Err(ForumError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_drops_foreign_snapshot() {
        let pool = migrated_pool().await;
        let registry = SessionRegistry::new(pool.clone());
        let uid = insert_user(&pool, "joon", "joon@x.com").await;
        let token = registry.issue(uid).await.unwrap();

        let own = registry.snapshot(&token).await.unwrap();
        let ctx = registry
            .authenticate(&token, Some(own.clone()))
            .await
            .unwrap();
        assert_eq!(ctx.user_id, uid);
        assert_eq!(ctx.cached, Some(own));

        let forged = CachedUser {
            id: uid + 1,
            username: "gigi".into(),
            email: "gigi@x.com".into(),
        };
        let ctx = registry.authenticate(&token, Some(forged)).await.unwrap();
        assert_eq!(ctx.user_id, uid);
        assert!(ctx.cached.is_none());
    }
}
