//! User repository for database operations

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{ForumError, ForumResult};
use crate::models::{CachedUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user that already holds its first session token
    pub async fn insert(
        conn: &mut SqliteConnection,
        username: &str,
        email: &str,
        password_hash: &str,
        session_token: &str,
    ) -> ForumResult<User> {
        info!("Creating new user: {}", username);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, session_token)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, email, password_hash, session_token, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(session_token)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| ForumError::from_write(e, "Username or email already exists"))
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> ForumResult<Option<User>> {
        info!("Finding user by email: {}", email);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, session_token, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(ForumError::Persistence)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> ForumResult<Option<User>> {
        info!("Finding user by ID: {}", id);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, session_token, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ForumError::Persistence)
    }

    /// Id of the user holding a session token
    pub async fn find_id_by_session_token(&self, token: &str) -> ForumResult<Option<i64>> {
        sqlx::query_scalar("SELECT id FROM users WHERE session_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(ForumError::Persistence)
    }

    /// Public identity fields of the user holding a session token
    pub async fn find_cached_by_session_token(
        &self,
        token: &str,
    ) -> ForumResult<Option<CachedUser>> {
        sqlx::query_as::<_, CachedUser>(
            "SELECT id, username, email FROM users WHERE session_token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(ForumError::Persistence)
    }

    /// Store a session token on a user, returning whether the user exists
    pub async fn set_session_token(&self, user_id: i64, token: &str) -> ForumResult<bool> {
        let result = sqlx::query("UPDATE users SET session_token = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ForumError::from_write(e, "Session token collision"))?;

        Ok(result.rows_affected() > 0)
    }
}
