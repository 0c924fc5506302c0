//! Transfer engine configuration.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_MAX_ATTEMPTS: &str = "LEDGER_MAX_ATTEMPTS";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "LEDGER_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "LEDGER_RETRY_MAX_DELAY_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be at least 1")]
    ZeroAttempts(&'static str),
}

/// Retry policy for optimistic write conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay after the first conflict.
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, conflicts surface immediately.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Exponential backoff after the given (1-indexed) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Transfer engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
}

impl EngineConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    /// Load from `LEDGER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (env, file, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut retry = RetryPolicy::default();

        if let Some(attempts) = parse::<u32>(&lookup, ENV_MAX_ATTEMPTS)? {
            if attempts == 0 {
                return Err(ConfigError::ZeroAttempts(ENV_MAX_ATTEMPTS));
            }
            retry.max_attempts = attempts;
        }
        if let Some(ms) = parse::<u64>(&lookup, ENV_RETRY_BASE_DELAY_MS)? {
            retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(&lookup, ENV_RETRY_MAX_DELAY_MS)? {
            retry.max_delay = Duration::from_millis(ms);
        }

        Ok(Self { retry })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}
