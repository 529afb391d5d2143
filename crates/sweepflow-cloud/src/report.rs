//! Deletion tallies and run reports

use crate::account::AccountId;
use crate::deleter::DeletionOutcome;
use crate::resource::{ResourceItem, ResourceKind};
use chrono::{DateTime, Utc};

/// Count of confirmed deletions for one resource family
///
/// Only ever grows, and only on [`DeletionOutcome::Deleted`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionTally {
    deleted: u64,
}

impl DeletionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `outcome` if it is a success; returns whether it was counted
    pub fn record(&mut self, outcome: &DeletionOutcome) -> bool {
        if outcome.is_deleted() {
            self.deleted += 1;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u64 {
        self.deleted
    }
}

/// An item whose delete call did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDeletion {
    pub item: ResourceItem,
    pub reason: String,
}

/// Outcome of cleaning one resource family
#[derive(Debug, Clone)]
pub struct TypeReport {
    pub kind: ResourceKind,
    pub tally: DeletionTally,
    pub pages_visited: usize,
    pub failures: Vec<FailedDeletion>,

    /// Entries removed by the family's pre-delete hook (objects, record sets)
    pub dependents_removed: u64,

    /// Items that no longer existed when their delete call ran
    pub already_gone: u64,

    /// Set when listing stopped early; items already handled stay counted
    pub listing_error: Option<String>,
}

impl TypeReport {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            tally: DeletionTally::new(),
            pages_visited: 0,
            failures: Vec::new(),
            dependents_removed: 0,
            already_gone: 0,
            listing_error: None,
        }
    }

    pub fn deleted(&self) -> u64 {
        self.tally.count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.listing_error.is_none()
    }

    pub fn summary_line(&self) -> String {
        format!("{} deleted: {}", self.kind.label(), self.deleted())
    }

    pub fn dependents_line(&self) -> Option<String> {
        self.kind
            .dependent()
            .map(|dependent| format!("{} deleted: {}", dependent.label(), self.dependents_removed))
    }

    pub fn already_gone_line(&self) -> Option<String> {
        (self.already_gone > 0)
            .then(|| format!("{} already gone: {}", self.kind.label(), self.already_gone))
    }

    pub fn failure_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .failures
            .iter()
            .map(|failure| {
                format!(
                    "Failed deleting {}: {} ({})",
                    self.kind.singular(),
                    failure.item.identity(),
                    failure.reason
                )
            })
            .collect();

        if let Some(error) = &self.listing_error {
            lines.push(format!("Failed listing {}: {}", self.kind.label(), error));
        }

        lines
    }
}

/// Everything one cleanup run did, in execution order
#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub account: AccountId,
    pub credentials_expire_at: Option<DateTime<Utc>>,
    pub types: Vec<TypeReport>,
}

impl CleanupReport {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            credentials_expire_at: None,
            types: Vec::new(),
        }
    }

    pub fn push(&mut self, report: TypeReport) {
        self.types.push(report);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&TypeReport> {
        self.types.iter().find(|r| r.kind == kind)
    }

    pub fn total_deleted(&self) -> u64 {
        self.types.iter().map(TypeReport::deleted).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.types
            .iter()
            .map(|r| r.failures.len() + usize::from(r.listing_error.is_some()))
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.types.iter().all(TypeReport::is_clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Bucket, Resource};

    #[test]
    fn test_tally_counts_only_successes() {
        let mut tally = DeletionTally::new();
        assert!(tally.record(&DeletionOutcome::Deleted));
        assert!(!tally.record(&DeletionOutcome::failed("denied")));
        assert!(!tally.record(&DeletionOutcome::AlreadyGone));
        assert!(tally.record(&DeletionOutcome::Deleted));
        assert_eq!(tally.count(), 2);
    }

    #[test]
    fn test_summary_and_failure_lines() {
        let mut report = TypeReport::new(ResourceKind::Bucket);
        report.tally.record(&DeletionOutcome::Deleted);
        report.failures.push(FailedDeletion {
            item: Bucket::new("keep-me").to_item(),
            reason: "BucketNotEmpty: not empty".to_string(),
        });

        assert_eq!(report.summary_line(), "S3 Buckets deleted: 1");
        assert_eq!(
            report.failure_lines(),
            vec!["Failed deleting S3 Bucket: keep-me (BucketNotEmpty: not empty)".to_string()]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_dependents_line() {
        let mut zones = TypeReport::new(ResourceKind::HostedZone);
        zones.dependents_removed = 3;
        assert_eq!(zones.dependents_line().as_deref(), Some("Records deleted: 3"));

        let volumes = TypeReport::new(ResourceKind::Volume);
        assert_eq!(volumes.dependents_line(), None);
    }

    #[test]
    fn test_already_gone_line() {
        let mut report = TypeReport::new(ResourceKind::Bucket);
        assert_eq!(report.already_gone_line(), None);

        report.already_gone = 2;
        assert_eq!(
            report.already_gone_line().as_deref(),
            Some("S3 Buckets already gone: 2")
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_listing_error_is_a_failure_line() {
        let mut report = TypeReport::new(ResourceKind::Snapshot);
        report.listing_error = Some("UnauthorizedOperation".to_string());

        assert_eq!(
            report.failure_lines(),
            vec!["Failed listing Snapshots: UnauthorizedOperation".to_string()]
        );
    }

    #[test]
    fn test_cleanup_report_totals() {
        let account = AccountId::parse("123456789012").unwrap();
        let mut report = CleanupReport::new(account);

        let mut buckets = TypeReport::new(ResourceKind::Bucket);
        buckets.tally.record(&DeletionOutcome::Deleted);
        let mut volumes = TypeReport::new(ResourceKind::Volume);
        volumes.tally.record(&DeletionOutcome::Deleted);
        volumes.tally.record(&DeletionOutcome::Deleted);
        volumes.listing_error = Some("throttled".to_string());

        report.push(buckets);
        report.push(volumes);

        assert_eq!(report.total_deleted(), 3);
        assert_eq!(report.total_failures(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.get(ResourceKind::Volume).unwrap().deleted(), 2);
        assert!(report.get(ResourceKind::HostedZone).is_none());
    }
}
