//! DNS record-set purge
//!
//! A hosted zone can only be deleted once it holds nothing but its NS and SOA
//! records. [`RecordSetPurger`] removes everything else, one change batch per
//! listed page, and is plugged into the zone cleaner as its pre-delete hook.

use crate::deleter::{DeletionOutcome, PreDelete};
use crate::error::Result;
use crate::page::{PageSource, PagedLister, ResourcePage};
use crate::resource::{HostedZone, RecordSet, ResourceItem};
use async_trait::async_trait;
use std::fmt::{self, Debug};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change<D> {
    pub action: ChangeAction,
    pub record: RecordSet<D>,
}

/// Ordered changes submitted to a zone as one atomic request
///
/// Built only through [`ChangeBatch::deletions`], so it never holds NS or SOA
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeBatch<D> {
    changes: Vec<Change<D>>,
}

impl<D> ChangeBatch<D> {
    /// DELETE changes for every record that is not structural, in listing order
    pub fn deletions(records: impl IntoIterator<Item = RecordSet<D>>) -> Self {
        let changes = records
            .into_iter()
            .filter(|record| !record.is_protected())
            .map(|record| Change {
                action: ChangeAction::Delete,
                record,
            })
            .collect();

        Self { changes }
    }

    pub fn changes(&self) -> &[Change<D>] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Short rendering for log lines: `DELETE A www.example.com., ...`
    pub fn describe(&self) -> String {
        self.changes
            .iter()
            .map(|change| {
                let item = ResourceItem::from(&change.record);
                format!("{} {}", change.action, item)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Record-set operations of a DNS provider
#[async_trait]
pub trait DnsService: Send + Sync {
    /// Provider representation of a record set, echoed back when deleting it
    type RecordData: Clone + Debug + Send + Sync;

    type RecordCursor: Clone + Debug + PartialEq + Send + Sync;

    async fn list_record_sets(
        &self,
        zone: &HostedZone,
        cursor: Option<&Self::RecordCursor>,
    ) -> Result<ResourcePage<RecordSet<Self::RecordData>, Self::RecordCursor>>;

    async fn change_record_sets(
        &self,
        zone: &HostedZone,
        batch: &ChangeBatch<Self::RecordData>,
    ) -> DeletionOutcome;
}

/// The record sets of one zone, as a [`PageSource`]
pub struct ZoneRecordSets<'a, S> {
    dns: &'a S,
    zone: &'a HostedZone,
}

impl<'a, S: DnsService> ZoneRecordSets<'a, S> {
    pub fn new(dns: &'a S, zone: &'a HostedZone) -> Self {
        Self { dns, zone }
    }
}

#[async_trait]
impl<'a, S: DnsService> PageSource for ZoneRecordSets<'a, S> {
    type Item = RecordSet<S::RecordData>;
    type Cursor = S::RecordCursor;

    async fn fetch_page(
        &self,
        cursor: Option<&Self::Cursor>,
    ) -> Result<ResourcePage<Self::Item, Self::Cursor>> {
        self.dns.list_record_sets(self.zone, cursor).await
    }
}

/// Deletes every non-structural record set of a zone
pub struct RecordSetPurger<'a, S> {
    dns: &'a S,
}

impl<'a, S: DnsService> RecordSetPurger<'a, S> {
    pub fn new(dns: &'a S) -> Self {
        Self { dns }
    }

    /// Purge `zone` page by page and return the number of records removed
    ///
    /// A rejected batch counts zero and the next page is still processed.
    /// A listing error stops the purge of this zone.
    pub async fn purge(&self, zone: &HostedZone) -> u64 {
        let source = ZoneRecordSets::new(self.dns, zone);
        let mut lister = PagedLister::new(&source);
        let mut removed = 0u64;

        loop {
            let page = match lister.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed listing record sets of zone {}: {}", zone.id, e);
                    break;
                }
            };

            let batch = ChangeBatch::deletions(page.items);
            if batch.is_empty() {
                tracing::debug!("Nothing to delete on this page of zone {}", zone.id);
                continue;
            }

            match self.dns.change_record_sets(zone, &batch).await {
                DeletionOutcome::Deleted => {
                    removed += batch.len() as u64;
                }
                DeletionOutcome::AlreadyGone => {
                    tracing::info!("Zone {} is already gone, stopping record purge", zone.id);
                    break;
                }
                DeletionOutcome::Failed(reason) => {
                    tracing::warn!(
                        "Failed deleting record set batch in zone {}: [{}] ({})",
                        zone.id,
                        batch.describe(),
                        reason
                    );
                }
            }
        }

        tracing::info!("Records deleted: {} (zone {})", removed, zone.name);
        removed
    }
}

#[async_trait]
impl<'a, S: DnsService> PreDelete<HostedZone> for RecordSetPurger<'a, S> {
    async fn before_delete(&self, zone: &HostedZone) -> u64 {
        if !zone.needs_record_purge() {
            tracing::debug!(
                "Zone {} holds {} record sets, skipping record purge",
                zone.id,
                zone.record_set_count
            );
            return 0;
        }
        self.purge(zone).await
    }
}
