//! Whole-account cleanup

use crate::account::AccountId;
use crate::cleaner::ResourceTypeCleaner;
use crate::dns::RecordSetPurger;
use crate::error::Result;
use crate::objects::BucketEmptier;
use crate::provider::{AccountServices, RoleAssumer, ServiceConnector, TerminationWaiter};
use crate::report::CleanupReport;

/// Assumes the cleanup role and empties the account family by family
///
/// The order is fixed: buckets, snapshots, instances, volumes, hosted zones.
/// Snapshots go before volumes; no dependency between them is inferred.
/// Instances are terminated and awaited before volumes so that attached
/// volumes are released. Only failing
/// to obtain credentials (or clients from them) aborts the run, and that
/// happens before any delete call.
pub struct Orchestrator<A, C> {
    assumer: A,
    connector: C,
}

impl<A, C> Orchestrator<A, C>
where
    A: RoleAssumer,
    C: ServiceConnector,
{
    pub fn new(assumer: A, connector: C) -> Self {
        Self { assumer, connector }
    }

    pub async fn run(&self, account: &AccountId) -> Result<CleanupReport> {
        tracing::info!("Assuming cleanup role in account {}", account);
        let credentials = self.assumer.assume_role(account).await?;
        if let Some(expiry) = credentials.expires_at {
            tracing::info!("Scoped credentials expire at {}", expiry);
        }

        let services = self.connector.connect(&credentials).await?;

        tracing::info!("Deleting resources for account {}", account);
        let mut report = CleanupReport::new(account.clone());
        report.credentials_expire_at = credentials.expires_at;

        let buckets = services.buckets();
        let emptier = BucketEmptier::new(buckets);
        report.push(
            ResourceTypeCleaner::new(buckets, buckets)
                .with_pre_delete(&emptier)
                .run()
                .await,
        );

        let snapshots = services.snapshots();
        report.push(ResourceTypeCleaner::new(snapshots, snapshots).run().await);

        let instances = services.instances();
        let terminated = ResourceTypeCleaner::new(instances, instances).run().await;
        if terminated.deleted() > 0 {
            tracing::info!("Waiting for {} instances to terminate", terminated.deleted());
            if let Err(e) = instances.wait_for_termination().await {
                tracing::warn!("Instances not confirmed terminated, continuing: {}", e);
            }
        }
        report.push(terminated);

        let volumes = services.volumes();
        report.push(ResourceTypeCleaner::new(volumes, volumes).run().await);

        let zones = services.zones();
        let purger = RecordSetPurger::new(zones);
        report.push(
            ResourceTypeCleaner::new(zones, zones)
                .with_pre_delete(&purger)
                .run()
                .await,
        );

        tracing::info!(
            "Cleanup of account {} finished: {} deleted, {} failures",
            account,
            report.total_deleted(),
            report.total_failures()
        );

        Ok(report)
    }
}
