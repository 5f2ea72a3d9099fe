//! Relational aggregator
//!
//! Folds the rows of a movie/genre left join into nested projections. Every
//! read is a single query; grouping happens client side in [`Grouped`], in
//! the order group keys first appear in the result stream. The queries order
//! rows by primary key so that order does not depend on the query plan.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;

use crate::error::{ForumError, ForumResult};
use crate::models::{Genre, GenreWithMovies, Movie, MovieWithGenres};

/// Unit separator used to join genre names in the concatenated row shape.
/// Seeding refuses control characters in genre names, so it never occurs
/// inside a name.
pub const CONCAT_SEPARATOR: char = '\u{1f}';

/// Parents keyed by id, each with an ordered, duplicate-free list of child
/// names.
#[derive(Debug)]
pub struct Grouped<P> {
    order: Vec<i64>,
    groups: HashMap<i64, (P, Vec<String>)>,
}

impl<P> Default for Grouped<P> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            groups: HashMap::new(),
        }
    }
}

impl<P> Grouped<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one row. `parent` only runs the first time `key` is seen.
    /// Missing or blank child names (left-join misses) are skipped.
    pub fn push(&mut self, key: i64, parent: impl FnOnce() -> P, child: Option<&str>) {
        let children = self.children(key, parent);
        if let Some(name) = child {
            add_child(children, name);
        }
    }

    /// Record one row whose child names arrive pre-concatenated
    pub fn push_concatenated(
        &mut self,
        key: i64,
        parent: impl FnOnce() -> P,
        joined: Option<&str>,
        separator: char,
    ) {
        let children = self.children(key, parent);
        for name in joined.into_iter().flat_map(|joined| joined.split(separator)) {
            add_child(children, name);
        }
    }

    fn children(&mut self, key: i64, parent: impl FnOnce() -> P) -> &mut Vec<String> {
        let order = &mut self.order;
        let (_, children) = self.groups.entry(key).or_insert_with(|| {
            order.push(key);
            (parent(), Vec::new())
        });
        children
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Groups in first-appearance order
    pub fn into_groups(mut self) -> Vec<(P, Vec<String>)> {
        self.order
            .iter()
            .filter_map(|key| self.groups.remove(key))
            .collect()
    }
}

/// How the movie/genre rows are shaped when they leave the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// One row per (movie, genre) pair
    #[default]
    PerLink,
    /// One row per movie, genre names joined with `GROUP_CONCAT` in genre
    /// id order
    Concatenated,
}

fn add_child(children: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if !name.is_empty() && !children.iter().any(|existing| existing == name) {
        children.push(name.to_string());
    }
}

/// Read-only projections over the catalog
#[derive(Clone)]
pub struct Aggregator {
    pool: SqlitePool,
    strategy: FetchStrategy,
}

impl Aggregator {
    /// Create an aggregator using the per-link row shape
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_strategy(pool, FetchStrategy::default())
    }

    pub fn with_strategy(pool: SqlitePool, strategy: FetchStrategy) -> Self {
        Self { pool, strategy }
    }

    /// Every movie with the names of its genres
    pub async fn movies_with_genres(&self) -> ForumResult<Vec<MovieWithGenres>> {
        let grouped = match self.strategy {
            FetchStrategy::PerLink => self.movie_rows_per_link().await?,
            FetchStrategy::Concatenated => self.movie_rows_concatenated().await?,
        };

        info!("Aggregated {} movies with genres", grouped.len());
        Ok(grouped
            .into_groups()
            .into_iter()
            .map(|(movie, genres)| MovieWithGenres { movie, genres })
            .collect())
    }

    /// Every genre with the distinct titles of its movies
    pub async fn genres_with_movies(&self) -> ForumResult<Vec<GenreWithMovies>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.name, m.title
            FROM genres g
            LEFT JOIN movie_genre mg ON g.id = mg.genre_id
            LEFT JOIN movies m ON mg.movie_id = m.id
            ORDER BY g.id, m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ForumError::Query)?;

        let mut grouped = Grouped::new();
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(ForumError::Query)?;
            let name: String = row.try_get("name").map_err(ForumError::Query)?;
            let title: Option<String> = row.try_get("title").map_err(ForumError::Query)?;
            grouped.push(id, || Genre { id, name }, title.as_deref());
        }

        info!("Aggregated {} genres with movies", grouped.len());
        Ok(grouped
            .into_groups()
            .into_iter()
            .map(|(genre, movies)| GenreWithMovies { genre, movies })
            .collect())
    }

    async fn movie_rows_per_link(&self) -> ForumResult<Grouped<Movie>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.title, m.description, m.release_date, m.image_url,
                   g.name AS genre
            FROM movies m
            LEFT JOIN movie_genre mg ON m.id = mg.movie_id
            LEFT JOIN genres g ON mg.genre_id = g.id
            ORDER BY m.id, g.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ForumError::Query)?;

        let mut grouped = Grouped::new();
        for row in &rows {
            let movie = movie_from_row(row)?;
            let genre: Option<String> = row.try_get("genre").map_err(ForumError::Query)?;
            grouped.push(movie.id, || movie, genre.as_deref());
        }
        Ok(grouped)
    }

    async fn movie_rows_concatenated(&self) -> ForumResult<Grouped<Movie>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.title, m.description, m.release_date, m.image_url,
                   GROUP_CONCAT(g.name, char(31) ORDER BY g.id) AS genres
            FROM movies m
            LEFT JOIN movie_genre mg ON m.id = mg.movie_id
            LEFT JOIN genres g ON mg.genre_id = g.id
            GROUP BY m.id
            ORDER BY m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ForumError::Query)?;

        let mut grouped = Grouped::new();
        for row in &rows {
            let movie = movie_from_row(row)?;
            let genres: Option<String> = row.try_get("genres").map_err(ForumError::Query)?;
            grouped.push_concatenated(movie.id, || movie, genres.as_deref(), CONCAT_SEPARATOR);
        }
        Ok(grouped)
    }
}

fn movie_from_row(row: &SqliteRow) -> ForumResult<Movie> {
    Ok(Movie {
        id: row.try_get("id").map_err(ForumError::Query)?,
        title: row.try_get("title").map_err(ForumError::Query)?,
        description: row.try_get("description").map_err(ForumError::Query)?,
        release_date: row.try_get("release_date").map_err(ForumError::Query)?,
        image_url: row.try_get("image_url").map_err(ForumError::Query)?,
    })
}

/// Caller-level policy: keep only movies tagged with at least one genre
pub fn tagged_only(movies: Vec<MovieWithGenres>) -> Vec<MovieWithGenres> {
    movies
        .into_iter()
        .filter(|movie| !movie.genres.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_genre, insert_movie, link, migrated_pool};

    #[test]
    fn test_grouped_keeps_first_appearance_order() {
        let mut grouped = Grouped::new();
        grouped.push(2, || "b", Some("x"));
        grouped.push(1, || "a", Some("y"));
        grouped.push(2, || "ignored", Some("z"));
        grouped.push(2, || "ignored", Some("x"));
        grouped.push(3, || "c", None);
        grouped.push(3, || "ignored", Some(""));

        assert_eq!(
            grouped.into_groups(),
            vec![
                ("b", vec!["x".to_string(), "z".to_string()]),
                ("a", vec!["y".to_string()]),
                ("c", vec![]),
            ]
        );
    }

    #[test]
    fn test_grouped_splits_concatenated_names() {
        let mut grouped = Grouped::new();
        grouped.push_concatenated(1, || "m", Some("Sci-Fi, Action,,Sci-Fi"), ',');
        grouped.push_concatenated(2, || "n", None, ',');

        assert_eq!(
            grouped.into_groups(),
            vec![
                ("m", vec!["Sci-Fi".to_string(), "Action".to_string()]),
                ("n", vec![]),
            ]
        );
    }

    async fn seeded() -> (SqlitePool, i64) {
        let pool = migrated_pool().await;
        let inception = insert_movie(&pool, "Inception").await;
        let matrix = insert_movie(&pool, "The Matrix").await;
        insert_movie(&pool, "Untagged").await;

        let action = insert_genre(&pool, "Action").await;
        let scifi = insert_genre(&pool, "Sci-Fi").await;
        insert_genre(&pool, "Drama").await;

        link(&pool, inception, scifi).await;
        link(&pool, matrix, action).await;
        link(&pool, matrix, scifi).await;
        (pool, matrix)
    }

    #[tokio::test]
    async fn test_movies_with_genres_both_strategies_agree() {
        let (pool, matrix) = seeded().await;

        let per_link = Aggregator::with_strategy(pool.clone(), FetchStrategy::PerLink)
            .movies_with_genres()
            .await
            .unwrap();
        let concatenated = Aggregator::with_strategy(pool, FetchStrategy::Concatenated)
            .movies_with_genres()
            .await
            .unwrap();

        assert_eq!(per_link, concatenated);

        let titles: Vec<_> = per_link.iter().map(|m| m.movie.title.as_str()).collect();
        assert_eq!(titles, ["Inception", "The Matrix", "Untagged"]);

        let matrix_entry = per_link.iter().find(|m| m.movie.id == matrix).unwrap();
        assert_eq!(matrix_entry.genres, ["Action", "Sci-Fi"]);
        assert_eq!(per_link[0].genres, ["Sci-Fi"]);
        assert!(per_link[2].genres.is_empty());
    }

    #[tokio::test]
    async fn test_strategies_agree_on_names_with_commas() {
        let pool = migrated_pool().await;
        let up = insert_movie(&pool, "Up").await;
        let adventure = insert_genre(&pool, "Action, Adventure").await;
        let family = insert_genre(&pool, "Family").await;
        link(&pool, up, family).await;
        link(&pool, up, adventure).await;

        let per_link = Aggregator::with_strategy(pool.clone(), FetchStrategy::PerLink)
            .movies_with_genres()
            .await
            .unwrap();
        let concatenated = Aggregator::with_strategy(pool, FetchStrategy::Concatenated)
            .movies_with_genres()
            .await
            .unwrap();

        assert_eq!(per_link[0].genres, ["Action, Adventure", "Family"]);
        assert_eq!(per_link, concatenated);
    }

    #[tokio::test]
    async fn test_genres_with_movies() {
        let (pool, _) = seeded().await;

        let genres = Aggregator::new(pool).genres_with_movies().await.unwrap();
        let summary: Vec<(&str, Vec<&str>)> = genres
            .iter()
            .map(|g| {
                (
                    g.genre.name.as_str(),
                    g.movies.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Action", vec!["The Matrix"]),
                ("Sci-Fi", vec!["Inception", "The Matrix"]),
                ("Drama", vec![]),
            ]
        );
    }

    #[tokio::test]
    async fn test_tagged_only_filter() {
        let (pool, _) = seeded().await;

        let movies = Aggregator::new(pool).movies_with_genres().await.unwrap();
        let tagged = tagged_only(movies);

        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|m| !m.genres.is_empty()));
    }

    #[tokio::test]
    async fn test_query_failure_surfaces_as_query_error() {
        let pool = migrated_pool().await;
        sqlx::query("DROP TABLE movie_genre")
            .execute(&pool)
            .await
            .unwrap();

        let result = Aggregator::new(pool).movies_with_genres().await;
        assert!(matches!(result, Err(ForumError::Query(_))));
    }
}
