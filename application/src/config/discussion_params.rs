//! Discussion parameters: fan-out, timeouts and retries.
//!
//! These are application-layer concerns, not domain policy: the domain
//! decides what a round means, these decide how the calls behind it run.

use crate::retry::RetryPolicy;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionParams {
    /// Maximum concurrent text-generation calls within a round
    pub max_in_flight: usize,
    /// Upper bound for one role's call, retries included
    pub role_timeout: Duration,
    /// Wall-clock budget for the whole discussion
    pub run_deadline: Option<Duration>,
    pub retry: RetryPolicy,
    /// Fail the run instead of degrading when every call fell back
    pub fail_on_total_outage: bool,
}

impl Default for DiscussionParams {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            role_timeout: Duration::from_secs(60),
            run_deadline: None,
            retry: RetryPolicy::default(),
            fail_on_total_outage: false,
        }
    }
}

impl DiscussionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    pub fn with_role_timeout(mut self, timeout: Duration) -> Self {
        self.role_timeout = timeout;
        self
    }

    pub fn with_run_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.run_deadline = deadline;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fail_on_total_outage(mut self, fail: bool) -> Self {
        self.fail_on_total_outage = fail;
        self
    }
}
