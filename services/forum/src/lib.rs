//! Movie forum backend
//!
//! Users register and log in, receive an opaque session token carried in a
//! cookie next to a cached snapshot of their profile, and post comments on
//! movies. Movies and genres are read back as nested projections built by
//! the [`aggregator`].
//!
//! ```rust,no_run
//! use common::database::DatabaseConfig;
//! use forum::{AppState, cookies::CookiePolicy, db, rate_limiter::RateLimiterConfig};
//! use forum::service::ForumService;
//!
//! async fn build_app() -> anyhow::Result<()> {
//!     let pool = db::connect(&DatabaseConfig::from_env()?).await?;
//!     let state = AppState {
//!         service: ForumService::new(pool, RateLimiterConfig::default()),
//!         cookies: CookiePolicy::default(),
//!     };
//!     let _router = forum::routes::create_router(state);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod cookies;
pub mod credentials;
pub mod db;
pub mod error;
pub mod guards;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod service;
pub mod session;
pub mod validation;

#[cfg(test)]
mod test_support;

use crate::{cookies::CookiePolicy, service::ForumService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ForumService,
    pub cookies: CookiePolicy,
}
