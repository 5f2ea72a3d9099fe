//! Forum models

pub mod comment;
pub mod movie;
pub mod user;

// Re-export for convenience
pub use comment::{Comment, NewComment};
pub use movie::{Genre, GenreWithMovies, Movie, MovieGenre, MovieWithGenres, NewGenre, NewMovie};
pub use user::{CachedUser, LoginCredentials, NewUser, User};
