//! Retry knob for provider calls
//!
//! Cleanup performs no retries unless this is raised explicitly. Providers
//! translate the policy into their SDK's own retry settings.

use crate::error::{CloudError, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_backoff: Duration,

    /// Maximum delay between retries
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// One attempt per call
    pub fn no_retry() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn retries_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(CloudError::InvalidConfig(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(CloudError::InvalidConfig(format!(
                "retry initial backoff ({:?}) exceeds max backoff ({:?})",
                self.initial_backoff, self.max_backoff
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.retries_enabled());
        assert_eq!(policy, RetryPolicy::no_retry());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_enabling_retries() {
        let policy = RetryPolicy::no_retry().with_max_attempts(3);
        assert!(policy.retries_enabled());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RetryPolicy::no_retry().with_max_attempts(0).validate().is_err());

        let inverted = RetryPolicy::no_retry()
            .with_backoff(Duration::from_secs(30), Duration::from_secs(1));
        assert!(matches!(
            inverted.validate(),
            Err(CloudError::InvalidConfig(_))
        ));
    }
}
