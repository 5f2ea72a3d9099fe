//! Forum service configuration

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::cookies::CookiePolicy;
use crate::rate_limiter::RateLimiterConfig;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Forum service configuration struct
#[derive(Debug, Clone)]
pub struct ForumConfig {
    /// Address the HTTP listener binds to
    pub bind_address: String,
    /// Lifetime of the session and user cookies, in minutes
    pub session_ttl_minutes: i64,
    pub secure_cookies: bool,
    /// Directory holding genres.json, movies.json and movie_genre.json
    pub seed_dir: Option<PathBuf>,
    pub login_max_attempts: u32,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            session_ttl_minutes: 30,
            secure_cookies: false,
            seed_dir: None,
            login_max_attempts: 5,
        }
    }
}

impl ForumConfig {
    /// Create a new ForumConfig from environment variables
    ///
    /// # Environment Variables
    /// - `FORUM_BIND_ADDRESS`: Listen address (default: "0.0.0.0:8080")
    /// - `FORUM_SESSION_TTL_MINUTES`: Cookie lifetime (default: 30)
    /// - `FORUM_SECURE_COOKIES`: Mark cookies Secure (default: false)
    /// - `FORUM_SEED_DIR`: Seed directory, seeding is skipped when unset
    /// - `FORUM_LOGIN_MAX_ATTEMPTS`: Failed logins before lockout (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_address = env::var("FORUM_BIND_ADDRESS").unwrap_or(defaults.bind_address);
        let session_ttl_minutes =
            parse_var("FORUM_SESSION_TTL_MINUTES")?.unwrap_or(defaults.session_ttl_minutes);
        let secure_cookies =
            parse_var("FORUM_SECURE_COOKIES")?.unwrap_or(defaults.secure_cookies);
        let seed_dir = env::var("FORUM_SEED_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        let login_max_attempts =
            parse_var("FORUM_LOGIN_MAX_ATTEMPTS")?.unwrap_or(defaults.login_max_attempts);

        if session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "FORUM_SESSION_TTL_MINUTES",
                value: session_ttl_minutes.to_string(),
            });
        }
        if login_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "FORUM_LOGIN_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_address,
            session_ttl_minutes,
            secure_cookies,
            seed_dir,
            login_max_attempts,
        })
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            ttl: time::Duration::minutes(self.session_ttl_minutes),
            secure: self.secure_cookies,
        }
    }

    pub fn login_limits(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_attempts: self.login_max_attempts,
            ..RateLimiterConfig::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(None),
    }
}
