//! Movie and genre repository
//!
//! Plain inserts used by seed ingestion; the nested read projections live in
//! the aggregator.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{ForumError, ForumResult};
use crate::models::{Movie, NewGenre, NewMovie};

/// Catalog repository
#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a genre, returning its id
    pub async fn insert_genre(conn: &mut SqliteConnection, genre: &NewGenre) -> ForumResult<i64> {
        let id = sqlx::query_scalar("INSERT INTO genres (name) VALUES (?) RETURNING id")
            .bind(&genre.name)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| ForumError::from_write(e, "Genre already exists"))?;

        info!("Inserted genre: {}", genre.name);
        Ok(id)
    }

    /// Insert a movie, returning its id
    pub async fn insert_movie(conn: &mut SqliteConnection, movie: &NewMovie) -> ForumResult<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, description, release_date, image_url)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.release_date)
        .bind(&movie.image_url)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| ForumError::from_write(e, "Movie already exists"))?;

        info!("Inserted movie: {}", movie.title);
        Ok(id)
    }

    /// Link a movie to a genre
    pub async fn link(conn: &mut SqliteConnection, movie_id: i64, genre_id: i64) -> ForumResult<()> {
        sqlx::query("INSERT INTO movie_genre (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| ForumError::from_write(e, "Movie is already linked to genre"))?;

        info!(
            "Inserted movie_genre: movie_id = {}, genre_id = {}",
            movie_id, genre_id
        );
        Ok(())
    }

    /// Find a movie by ID
    pub async fn find_movie(&self, id: i64) -> ForumResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, release_date, image_url FROM movies WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ForumError::Query)
    }

    /// Number of rows in each catalog table: (genres, movies, links)
    pub async fn counts(&self) -> ForumResult<(i64, i64, i64)> {
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM genres),
                (SELECT COUNT(*) FROM movies),
                (SELECT COUNT(*) FROM movie_genre)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(ForumError::Query)
    }
}
