//! Single-item deletion

use async_trait::async_trait;
use std::fmt;

/// Result of one delete call
///
/// Transport errors and non-success responses both map to `Failed`; the
/// caller logs them and moves on to the next item. An item that vanished
/// between listing and its delete call is `AlreadyGone`: neither counted nor
/// reported as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    AlreadyGone,
    Failed(String),
}

impl DeletionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        DeletionOutcome::Failed(reason.into())
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DeletionOutcome::Failed(_))
    }

    /// Classify the result of an API call
    pub fn from_result<T, E: fmt::Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => DeletionOutcome::Deleted,
            Err(e) => DeletionOutcome::Failed(e.to_string()),
        }
    }
}

/// Issues the delete call for one listed item
#[async_trait]
pub trait ResourceDeleter<T: Sync>: Send + Sync {
    async fn delete(&self, item: &T) -> DeletionOutcome;
}

/// Sub-work that has to finish for an item right before its delete call
///
/// Returns the number of dependent entries removed. The default does nothing.
#[async_trait]
pub trait PreDelete<T: Sync>: Send + Sync {
    async fn before_delete(&self, item: &T) -> u64 {
        let _ = item;
        0
    }
}

/// Hook for families without dependent entries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreDelete;

impl<T: Sync> PreDelete<T> for NoPreDelete {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let ok: Result<(), String> = Ok(());
        assert_eq!(DeletionOutcome::from_result(ok), DeletionOutcome::Deleted);

        let err: Result<(), String> = Err("AccessDenied: not allowed".to_string());
        assert_eq!(
            DeletionOutcome::from_result(err),
            DeletionOutcome::failed("AccessDenied: not allowed")
        );
    }

    #[test]
    fn test_is_deleted() {
        assert!(DeletionOutcome::Deleted.is_deleted());
        assert!(!DeletionOutcome::failed("boom").is_deleted());
        assert!(!DeletionOutcome::AlreadyGone.is_deleted());
    }

    #[test]
    fn test_already_gone_is_not_a_failure() {
        assert!(!DeletionOutcome::AlreadyGone.is_failed());
        assert!(DeletionOutcome::failed("NoSuchBucket").is_failed());
    }

    #[tokio::test]
    async fn test_no_pre_delete_removes_nothing() {
        let hook = NoPreDelete;
        assert_eq!(PreDelete::<String>::before_delete(&hook, &"x".to_string()).await, 0);
    }
}
