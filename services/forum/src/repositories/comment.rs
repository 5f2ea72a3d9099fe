//! Comment repository for database operations

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{ForumError, ForumResult};
use crate::models::Comment;

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a comment on the caller's transaction
    pub async fn insert(
        conn: &mut SqliteConnection,
        user_id: i64,
        movie_id: i64,
        content: &str,
    ) -> ForumResult<Comment> {
        info!("Adding comment by user {} on movie {}", user_id, movie_id);

        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (user_id, movie_id, content)
            VALUES (?, ?, ?)
            RETURNING id, user_id, movie_id, content, created_at
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(content)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| ForumError::from_write(e, "Comment already exists"))
    }

    /// Comments on a movie, oldest first
    pub async fn list_for_movie(&self, movie_id: i64) -> ForumResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, user_id, movie_id, content, created_at
            FROM comments
            WHERE movie_id = ?
            ORDER BY id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(ForumError::Query)
    }
}
