//! Retry policy for upstream rate requests.

use std::time::Duration;

use crate::http_client::{HttpError, HttpErrorKind};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Waits the same amount before every retry.
    Fixed {
        /// Pause between two attempts.
        delay: Duration,
    },
    /// Grows the wait with every retry.
    ///
    /// The delay is `base * factor^attempt`, capped at `max`.
    Exponential {
        /// Pause before the first retry.
        base: Duration,
        /// Multiplier applied once per further retry.
        factor: f64,
        /// Upper bound on any single pause, applied before jitter.
        max: Duration,
        /// Spreads each pause uniformly over +/- 50% of its value.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay to sleep before retry number `attempt`.
    ///
    /// `attempt` is 0-based: `0` is the pause between the first request and
    /// the first retry. [`Backoff::Fixed`] ignores it. With jitter enabled
    /// the result is random and may exceed `max` by up to half of it.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds.max(0.0));
                if jitter {
                    jittered(delay)
                } else {
                    delay
                }
            }
        }
    }
}

fn jittered(delay: Duration) -> Duration {
    let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let spread = millis / 2;
    let low = millis - spread;
    Duration::from_millis(low.saturating_add(fastrand::u64(0..=spread.saturating_mul(2))))
}

/// When and how often a failed request is attempted again.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Turns retrying off entirely when `false`.
    pub enabled: bool,
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Pause schedule between attempts.
    pub backoff: Backoff,
    /// HTTP statuses worth another attempt.
    pub retry_on_status: Vec<u16>,
    /// Retry when the request timed out.
    pub retry_on_timeout: bool,
    /// Retry when no connection could be made.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether attempt number `attempt` (0-based) may be followed by another one.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        match error.kind() {
            HttpErrorKind::Timeout => self.retry_on_timeout,
            HttpErrorKind::Connect => self.retry_on_connect,
            HttpErrorKind::Body | HttpErrorKind::Other => false,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
    }

    #[test]
    fn fixed_backoff_ignores_attempt() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(75),
        };
        assert_eq!(backoff.delay(0), backoff.delay(7));
        assert_eq!(backoff.delay(0), Duration::from_millis(75));
    }

    #[test]
    fn jitter_stays_within_half_of_delay() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..20 {
            let millis = backoff.delay(0).as_millis();
            assert!((100..=300).contains(&millis), "delay {millis}ms out of range");
        }
    }

    #[test]
    fn default_retries_transient_statuses_only() {
        let config = RetryConfig::default();

        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(404));
        assert!(config.allows_retry(0));
        assert!(config.allows_retry(1));
        assert!(!config.allows_retry(2));
    }

    #[test]
    fn transport_errors_follow_flags() {
        let config = RetryConfig {
            retry_on_connect: false,
            ..RetryConfig::default()
        };

        assert!(config.should_retry_error(&HttpError::timeout("slow")));
        assert!(!config.should_retry_error(&HttpError::connect("refused")));
        assert!(!config.should_retry_error(&HttpError::new(HttpErrorKind::Body, "truncated")));
    }

    #[test]
    fn disabled_config_never_retries() {
        let config = RetryConfig::no_retry();
        assert!(!config.allows_retry(0));
    }
}
