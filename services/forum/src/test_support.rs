//! Fixtures shared by the unit tests

use common::database::DatabaseConfig;
use sqlx::SqlitePool;

use crate::db;

pub async fn migrated_pool() -> SqlitePool {
    db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Insert a user with a placeholder digest, returning its id
pub async fn insert_user(pool: &SqlitePool, username: &str, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, 'unused') RETURNING id",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("insert user")
}

pub async fn insert_movie(pool: &SqlitePool, title: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO movies (title, description, release_date, image_url) VALUES (?, '', '', '') RETURNING id",
    )
    .bind(title)
    .fetch_one(pool)
    .await
    .expect("insert movie")
}

pub async fn insert_genre(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO genres (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("insert genre")
}

pub async fn link(pool: &SqlitePool, movie_id: i64, genre_id: i64) {
    sqlx::query("INSERT INTO movie_genre (movie_id, genre_id) VALUES (?, ?)")
        .bind(movie_id)
        .bind(genre_id)
        .execute(pool)
        .await
        .expect("link movie and genre");
}
