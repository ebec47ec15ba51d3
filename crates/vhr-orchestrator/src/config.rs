//! Orchestration timing and retry configuration.

use std::time::Duration;

use vhr_client::RetryPolicy;

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default ceiling on status queries per job.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Default wall-clock budget for a whole polling session.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Default budget for a single backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Task poller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Overall session timeout, racing the whole poll loop.
    pub timeout: Duration,
    /// Timeout wrapped around each status query.
    pub request_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_POLL_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Everything the orchestrator needs besides a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrchestratorConfig {
    pub poll: PollConfig,
    /// Backoff applied to job submission.
    pub retry: RetryPolicy,
    /// Advance progress cosmetically between real checkpoints.
    pub interpolate_progress: bool,
}

impl OrchestratorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables (unparsable values fall back to the default):
    /// - `VHR_POLL_INTERVAL_MS` (default: 2000)
    /// - `VHR_POLL_MAX_ATTEMPTS` (default: 100)
    /// - `VHR_POLL_TIMEOUT_MS` (default: 60000)
    /// - `VHR_REQUEST_TIMEOUT_MS` (default: 60000)
    /// - `VHR_SUBMIT_RETRIES` (default: 2)
    /// - `VHR_RETRY_BASE_DELAY_MS` (default: 1000)
    /// - `VHR_INTERPOLATE_PROGRESS` (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let count = |key: &str, default: u32| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(default)
        };

        Self {
            poll: PollConfig {
                interval: millis("VHR_POLL_INTERVAL_MS", defaults.poll.interval),
                max_attempts: count("VHR_POLL_MAX_ATTEMPTS", defaults.poll.max_attempts).max(1),
                timeout: millis("VHR_POLL_TIMEOUT_MS", defaults.poll.timeout),
                request_timeout: millis("VHR_REQUEST_TIMEOUT_MS", defaults.poll.request_timeout),
            },
            retry: RetryPolicy {
                max_retries: count("VHR_SUBMIT_RETRIES", defaults.retry.max_retries),
                base_delay: millis("VHR_RETRY_BASE_DELAY_MS", defaults.retry.base_delay),
            },
            interpolate_progress: lookup("VHR_INTERPOLATE_PROGRESS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.interpolate_progress),
        }
    }
}
