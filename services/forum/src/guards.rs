//! Write-path guards
//!
//! Each guard is a read that must pass before the matching insert. Callers
//! run the guard and the insert on the same transaction; the unique indexes
//! in the schema catch whatever slips between them.

use sqlx::SqliteConnection;

use crate::error::{ForumError, ForumResult};

/// Reject a registration whose email is already taken
pub async fn ensure_email_available(conn: &mut SqliteConnection, email: &str) -> ForumResult<()> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ForumError::Persistence)?;

    match existing {
        Some(_) => Err(ForumError::Conflict("Email already exists".to_string())),
        None => Ok(()),
    }
}

/// Reject a registration whose username is already taken
pub async fn ensure_username_available(
    conn: &mut SqliteConnection,
    username: &str,
) -> ForumResult<()> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ForumError::Persistence)?;

    match existing {
        Some(_) => Err(ForumError::Conflict("Username already exists".to_string())),
        None => Ok(()),
    }
}

/// Reject a comment author id that was never set
pub fn ensure_author_set(user_id: i64) -> ForumResult<()> {
    if user_id <= 0 {
        return Err(ForumError::Validation("Invalid user id".to_string()));
    }
    Ok(())
}

/// Reject a comment on a movie that does not exist
pub async fn ensure_movie_exists(conn: &mut SqliteConnection, movie_id: i64) -> ForumResult<()> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM movies WHERE id = ?")
        .bind(movie_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ForumError::Persistence)?;

    match existing {
        Some(_) => Ok(()),
        None => Err(ForumError::Validation(
            "Movie does not exist, can't add comment".to_string(),
        )),
    }
}

/// Reject a comment identical to one the same user already left on the movie
pub async fn ensure_comment_is_new(
    conn: &mut SqliteConnection,
    user_id: i64,
    movie_id: i64,
    content: &str,
) -> ForumResult<()> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM comments WHERE user_id = ? AND movie_id = ? AND content = ?",
    )
    .bind(user_id)
    .bind(movie_id)
    .bind(content)
    .fetch_optional(&mut *conn)
    .await
    .map_err(ForumError::Persistence)?;

    match existing {
        Some(_) => Err(ForumError::Conflict("Comment already exists".to_string())),
        None => Ok(()),
    }
}

/// Whether a genre with this name is already stored
pub async fn genre_exists(conn: &mut SqliteConnection, name: &str) -> ForumResult<bool> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ForumError::Persistence)?;

    Ok(existing.is_some())
}

/// Whether a movie with this title is already stored
pub async fn movie_title_exists(conn: &mut SqliteConnection, title: &str) -> ForumResult<bool> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM movies WHERE title = ?")
        .bind(title)
        .fetch_optional(&mut *conn)
        .await
        .map_err(ForumError::Persistence)?;

    Ok(existing.is_some())
}

/// Whether a movie is already linked to a genre
pub async fn movie_genre_exists(
    conn: &mut SqliteConnection,
    movie_id: i64,
    genre_id: i64,
) -> ForumResult<bool> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT movie_id FROM movie_genre WHERE movie_id = ? AND genre_id = ?")
            .bind(movie_id)
            .bind(genre_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(ForumError::Persistence)?;

    Ok(existing.is_some())
}
