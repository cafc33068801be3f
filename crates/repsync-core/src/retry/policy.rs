use std::time::Duration;

/// What a failed FTP request means for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect, login or data transfer ran past its deadline.
    Timeout,
    /// The control or data socket could not be opened or was dropped.
    Connection,
    /// 4xx reply: the server asks to try again later (421, 425, 426, 450-452).
    Transient(u32),
    /// Permanent reply, local I/O error, or a file gone from the archive.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// How often, and how patiently, one request against the archive is repeated.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per request, the first one included.
    pub max_attempts: u32,
    /// Pause before the second attempt; doubles for each one after.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Whether attempt number `attempt` (1-based), which failed with `kind`,
    /// gets another try and after what pause.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        let retryable = !matches!(kind, ErrorKind::Other);
        if !retryable || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }

    /// Pause after failed attempt `attempt`: `base_delay * 2^(attempt - 1)`,
    /// never above `max_delay`.
    fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay)
    }
}
