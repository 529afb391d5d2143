//! "Delete everything of this type"

use crate::deleter::{DeletionOutcome, NoPreDelete, PreDelete, ResourceDeleter};
use crate::page::{PageSource, PagedLister};
use crate::report::{FailedDeletion, TypeReport};
use crate::resource::Resource;

/// Cleans one resource family: list every page, run the pre-delete hook and
/// the delete call for each item, and count what was actually deleted.
///
/// Items are handled strictly one after another. A failed delete is recorded
/// and skipped; a listing error ends this family's pass early.
pub struct ResourceTypeCleaner<'a, S, D, P = NoPreDelete> {
    source: &'a S,
    deleter: &'a D,
    hook: &'a P,
}

impl<'a, S, D> ResourceTypeCleaner<'a, S, D, NoPreDelete>
where
    S: PageSource,
    S::Item: Resource,
    D: ResourceDeleter<S::Item>,
{
    pub fn new(source: &'a S, deleter: &'a D) -> Self {
        Self {
            source,
            deleter,
            hook: &NoPreDelete,
        }
    }
}

impl<'a, S, D, P> ResourceTypeCleaner<'a, S, D, P>
where
    S: PageSource,
    S::Item: Resource,
    D: ResourceDeleter<S::Item>,
    P: PreDelete<S::Item>,
{
    /// Run `hook` for every item before its delete call
    pub fn with_pre_delete<Q>(self, hook: &'a Q) -> ResourceTypeCleaner<'a, S, D, Q>
    where
        Q: PreDelete<S::Item>,
    {
        ResourceTypeCleaner {
            source: self.source,
            deleter: self.deleter,
            hook,
        }
    }

    pub async fn run(&self) -> TypeReport {
        let kind = <S::Item as Resource>::KIND;
        let mut report = TypeReport::new(kind);
        let mut lister = PagedLister::new(self.source);

        tracing::info!("Cleaning {}", kind.label());

        loop {
            let page = match lister.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed listing {}: {}", kind.label(), e);
                    report.listing_error = Some(e.to_string());
                    break;
                }
            };

            for item in &page.items {
                tracing::debug!(?item, "Processing {}", kind.singular());

                report.dependents_removed += self.hook.before_delete(item).await;

                match self.deleter.delete(item).await {
                    DeletionOutcome::Deleted => {
                        report.tally.record(&DeletionOutcome::Deleted);
                        tracing::info!("Deleted {}: {}", kind.singular(), item.identity());
                    }
                    DeletionOutcome::AlreadyGone => {
                        report.already_gone += 1;
                        tracing::info!("{} already gone: {}", kind.singular(), item.identity());
                    }
                    DeletionOutcome::Failed(reason) => {
                        tracing::warn!(
                            "Failed deleting {}: {} ({})",
                            kind.singular(),
                            item.identity(),
                            reason
                        );
                        report.failures.push(FailedDeletion {
                            item: item.to_item(),
                            reason,
                        });
                    }
                }
            }
        }

        report.pages_visited = lister.pages_visited();
        tracing::info!("{}", report.summary_line());

        report
    }
}
