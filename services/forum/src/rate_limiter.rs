//! Login attempt limiter, keyed by account email

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{ForumError, ForumResult};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    pub window: Duration,
    /// How long a key stays locked once it runs out of attempts
    pub lockout: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(900),
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    window_started: Instant,
    locked_until: Option<Instant>,
}

impl Attempts {
    /// Still locked, or its counting window has not run out
    fn is_live(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => now < until,
            None => now.duration_since(self.window_started) < window,
        }
    }
}

/// Login rate limiter. Clones share state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reject the attempt if the key is locked out
    pub async fn check(&self, key: &str) -> ForumResult<()> {
        self.check_at(&normalize(key), Instant::now()).await
    }

    /// Count a failed attempt, locking the key once it runs out
    pub async fn record_failure(&self, key: &str) {
        self.record_failure_at(&normalize(key), Instant::now()).await
    }

    /// Forget a key after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(&normalize(key));
    }

    async fn check_at(&self, key: &str, now: Instant) -> ForumResult<()> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };

        match entry.locked_until {
            Some(until) if now < until => Err(ForumError::RateLimited(
                "Too many login attempts, try again later".to_string(),
            )),
            Some(_) => {
                entries.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn record_failure_at(&self, key: &str, now: Instant) {
        let mut entries = self.entries.lock().await;
        let window = self.config.window;
        entries.retain(|_, attempts| attempts.is_live(now, window));

        let entry = entries.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            window_started: now,
            locked_until: None,
        });

        if now.duration_since(entry.window_started) >= self.config.window {
            entry.count = 0;
            entry.window_started = now;
        }

        entry.count += 1;
        if entry.count >= self.config.max_attempts && entry.locked_until.is_none() {
            entry.locked_until = Some(now + self.config.lockout);
            warn!(
                "Locked login for {} after {} failed attempts",
                key, entry.count
            );
        }
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
