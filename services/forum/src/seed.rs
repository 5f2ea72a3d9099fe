//! Catalog seeding from JSON files
//!
//! Each record is checked and inserted on its own transaction, keyed by its
//! natural key, so ingesting the same data twice leaves the catalog
//! unchanged. The first failing record stops the run; records committed
//! before it stay.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use crate::db;
use crate::error::{ForumError, ForumResult};
use crate::guards;
use crate::models::{MovieGenre, NewGenre, NewMovie};
use crate::repositories::CatalogRepository;

pub const GENRES_FILE: &str = "genres.json";
pub const MOVIES_FILE: &str = "movies.json";
pub const LINKS_FILE: &str = "movie_genre.json";

/// Seeding error
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] ForumError),
}

/// Parsed seed files
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub genres: Vec<NewGenre>,
    pub movies: Vec<NewMovie>,
    pub links: Vec<MovieGenre>,
}

impl SeedData {
    /// Read the three seed files from `dir`
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, SeedError> {
        let dir = dir.as_ref();
        Ok(Self {
            genres: read_json(&dir.join(GENRES_FILE))?,
            movies: read_json(&dir.join(MOVIES_FILE))?,
            links: read_json(&dir.join(LINKS_FILE))?,
        })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Inserted and skipped record counts for one kind of record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub inserted: usize,
    pub skipped: usize,
}

impl Tally {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub genres: Tally,
    pub movies: Tally,
    pub links: Tally,
}

/// Apply seed data: genres, then movies, then links
pub async fn ingest(pool: &SqlitePool, data: &SeedData) -> ForumResult<SeedReport> {
    let mut report = SeedReport::default();

    for genre in &data.genres {
        report.genres.record(seed_genre(pool, genre).await?);
    }
    for movie in &data.movies {
        report.movies.record(seed_movie(pool, movie).await?);
    }
    for link in &data.links {
        report.links.record(seed_link(pool, link).await?);
    }

    info!(
        "Seeding done: genres {}/{}, movies {}/{}, links {}/{} (inserted/skipped)",
        report.genres.inserted,
        report.genres.skipped,
        report.movies.inserted,
        report.movies.skipped,
        report.links.inserted,
        report.links.skipped
    );
    Ok(report)
}

async fn seed_genre(pool: &SqlitePool, genre: &NewGenre) -> ForumResult<bool> {
    if genre.name.trim().is_empty() || genre.name.contains(char::is_control) {
        return Err(ForumError::Validation(format!(
            "Invalid genre name: {:?}",
            genre.name
        )));
    }

    let mut tx = db::begin_write(pool).await?;
    if guards::genre_exists(&mut tx, &genre.name).await? {
        info!("Genre already exists: {}", genre.name);
        return Ok(false);
    }

    CatalogRepository::insert_genre(&mut tx, genre)
        .await
        .inspect_err(|e| error!("Failed to seed genre {}: {}", genre.name, e))?;
    tx.commit().await.map_err(ForumError::Persistence)?;
    Ok(true)
}

async fn seed_movie(pool: &SqlitePool, movie: &NewMovie) -> ForumResult<bool> {
    let mut tx = db::begin_write(pool).await?;
    if guards::movie_title_exists(&mut tx, &movie.title).await? {
        info!("Movie already exists: {}", movie.title);
        return Ok(false);
    }

    CatalogRepository::insert_movie(&mut tx, movie)
        .await
        .inspect_err(|e| error!("Failed to seed movie {}: {}", movie.title, e))?;
    tx.commit().await.map_err(ForumError::Persistence)?;
    Ok(true)
}

async fn seed_link(pool: &SqlitePool, link: &MovieGenre) -> ForumResult<bool> {
    let mut tx = db::begin_write(pool).await?;
    if guards::movie_genre_exists(&mut tx, link.movie_id, link.genre_id).await? {
        info!(
            "movie_genre already exists: movie_id = {}, genre_id = {}",
            link.movie_id, link.genre_id
        );
        return Ok(false);
    }

    CatalogRepository::link(&mut tx, link.movie_id, link.genre_id)
        .await
        .inspect_err(|e| {
            error!(
                "Failed to seed movie_genre ({}, {}): {}",
                link.movie_id, link.genre_id, e
            )
        })?;
    tx.commit().await.map_err(ForumError::Persistence)?;
    Ok(true)
}
