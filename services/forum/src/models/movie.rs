//! Movie and genre models, plus the aggregated projections

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Movie entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Kept as the opaque string found in the seed data
    pub release_date: String,
    pub image_url: String,
}

/// Movie seed record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub image_url: String,
}

/// Genre entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Genre seed record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGenre {
    pub name: String,
}

/// Movie/genre link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MovieGenre {
    pub movie_id: i64,
    pub genre_id: i64,
}

/// A movie with the names of its genres, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieWithGenres {
    pub movie: Movie,
    pub genres: Vec<String>,
}

/// A genre with the distinct titles of its movies, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreWithMovies {
    pub genre: Genre,
    pub movies: Vec<String>,
}
