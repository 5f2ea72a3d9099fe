//! Comment model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// Comment creation payload. The author comes from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub movie_id: i64,
    pub content: String,
}
