//! Handler-facing forum operations
//!
//! Each write runs its guards and its insert on one transaction. Reads go
//! straight to the aggregator.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::aggregator::{Aggregator, FetchStrategy};
use crate::credentials::{CredentialError, hash_off_thread, verify_off_thread};
use crate::db;
use crate::error::{ForumError, ForumResult};
use crate::guards;
use crate::models::{
    CachedUser, Comment, GenreWithMovies, LoginCredentials, MovieWithGenres, NewComment, NewUser,
};
use crate::rate_limiter::{RateLimiter, RateLimiterConfig};
use crate::repositories::{CatalogRepository, CommentRepository, UserRepository};
use crate::session::{SessionContext, SessionRegistry};
use crate::validation::{validate_comment, validate_email, validate_password, validate_username};

/// Token plus display snapshot handed back by register and login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub token: String,
    pub user: CachedUser,
}

/// Forum service
#[derive(Clone)]
pub struct ForumService {
    pool: SqlitePool,
    users: UserRepository,
    comments: CommentRepository,
    catalog: CatalogRepository,
    sessions: SessionRegistry,
    aggregator: Aggregator,
    login_limiter: RateLimiter,
}

impl ForumService {
    /// Create a forum service over a migrated pool
    pub fn new(pool: SqlitePool, login_limits: RateLimiterConfig) -> Self {
        Self::with_strategy(pool, login_limits, FetchStrategy::default())
    }

    pub fn with_strategy(
        pool: SqlitePool,
        login_limits: RateLimiterConfig,
        strategy: FetchStrategy,
    ) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            sessions: SessionRegistry::new(pool.clone()),
            aggregator: Aggregator::with_strategy(pool.clone(), strategy),
            login_limiter: RateLimiter::new(login_limits),
            pool,
        }
    }

    /// Register a user and open their first session
    pub async fn register(&self, new_user: &NewUser) -> ForumResult<SessionGrant> {
        validate_username(&new_user.username)?;
        validate_email(&new_user.email)?;
        validate_password(&new_user.password)?;

        let password_hash = hash_off_thread(new_user.password.clone()).await?;
        let token = SessionRegistry::new_token();

        let mut tx = db::begin_write(&self.pool).await?;
        guards::ensure_email_available(&mut tx, &new_user.email).await?;
        guards::ensure_username_available(&mut tx, &new_user.username).await?;
        let user = UserRepository::insert(
            &mut tx,
            &new_user.username,
            &new_user.email,
            &password_hash,
            &token,
        )
        .await?;
        tx.commit().await.map_err(ForumError::Persistence)?;

        info!("User registered: {}", user.id);
        Ok(SessionGrant {
            token,
            user: user.cached(),
        })
    }

    /// Check credentials and hand back the user's session, issuing one if
    /// the user holds none
    pub async fn login(&self, credentials: &LoginCredentials) -> ForumResult<SessionGrant> {
        self.login_limiter.check(&credentials.email).await?;

        let user = match self.users.find_by_email(&credentials.email).await? {
            Some(user) => user,
            None => return Err(self.reject_login(&credentials.email).await),
        };

        match verify_off_thread(
            user.password_hash.clone(),
            credentials.password.clone(),
        )
        .await
        {
            Ok(()) => {}
            Err(CredentialError::Mismatch) => {
                return Err(self.reject_login(&credentials.email).await);
            }
            Err(e) => return Err(e.into()),
        }
        self.login_limiter.reset(&credentials.email).await;

        let token = self
            .sessions
            .ensure(user.id, user.session_token.as_deref())
            .await?;

        info!("User logged in: {}", user.id);
        Ok(SessionGrant {
            token,
            user: user.cached(),
        })
    }

    async fn reject_login(&self, email: &str) -> ForumError {
        warn!("Failed login attempt for {}", email);
        self.login_limiter.record_failure(email).await;
        ForumError::Auth("Invalid email or password".to_string())
    }

    /// Resolve a session token into a request context
    pub async fn authenticate(
        &self,
        token: &str,
        cached: Option<CachedUser>,
    ) -> ForumResult<SessionContext> {
        self.sessions.authenticate(token, cached).await
    }

    /// Post a comment as the holder of `token`
    pub async fn post_comment(&self, token: &str, comment: &NewComment) -> ForumResult<Comment> {
        let session = self.authenticate(token, None).await?;
        self.post_comment_as(&session, comment).await
    }

    /// Post a comment for an already authenticated session
    pub async fn post_comment_as(
        &self,
        session: &SessionContext,
        comment: &NewComment,
    ) -> ForumResult<Comment> {
        guards::ensure_author_set(session.user_id)?;
        validate_comment(&comment.content)?;

        let mut tx = db::begin_write(&self.pool).await?;
        guards::ensure_movie_exists(&mut tx, comment.movie_id).await?;
        guards::ensure_comment_is_new(&mut tx, session.user_id, comment.movie_id, &comment.content)
            .await?;
        let created =
            CommentRepository::insert(&mut tx, session.user_id, comment.movie_id, &comment.content)
                .await?;
        tx.commit().await.map_err(ForumError::Persistence)?;

        Ok(created)
    }

    /// Comments on one movie, oldest first
    pub async fn list_comments(&self, movie_id: i64) -> ForumResult<Vec<Comment>> {
        if self.catalog.find_movie(movie_id).await?.is_none() {
            return Err(ForumError::Validation(format!(
                "Movie {} does not exist",
                movie_id
            )));
        }
        self.comments.list_for_movie(movie_id).await
    }

    pub async fn list_movies_with_genres(&self) -> ForumResult<Vec<MovieWithGenres>> {
        self.aggregator.movies_with_genres().await
    }

    pub async fn list_genres_with_movies(&self) -> ForumResult<Vec<GenreWithMovies>> {
        self.aggregator.genres_with_movies().await
    }

    /// Shared pool handle, for health checks
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
