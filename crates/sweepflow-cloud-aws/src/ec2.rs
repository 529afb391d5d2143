//! EBS snapshots, EC2 instances and EBS volumes

use crate::error::{deletion_outcome, listing_failed};
use crate::next_cursor;
use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::client::Waiters;
use aws_sdk_ec2::types::Filter;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use sweepflow_cloud::{
    CloudError, DeletionOutcome, Instance, PageSource, ResourceDeleter, ResourcePage, Result,
    Snapshot, TerminationWaiter, Volume,
};

/// Restricts snapshot listing to the account's own snapshots
///
/// Without it DescribeSnapshots also returns every public snapshot.
pub const SNAPSHOT_OWNER: &str = "self";

/// Instance states that still need a TerminateInstances call
///
/// `shutting-down` and `terminated` instances are already on their way out.
pub const LIVE_INSTANCE_STATES: [&str; 4] = ["pending", "running", "stopping", "stopped"];

/// How long to wait for terminated instances before moving on to volumes
pub const DEFAULT_TERMINATION_WAIT: Duration = Duration::from_secs(300);

pub struct Ec2Snapshots {
    client: Client,
}

impl Ec2Snapshots {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for Ec2Snapshots {
    type Item = Snapshot;
    type Cursor = String;

    async fn fetch_page(&self, cursor: Option<&String>) -> Result<ResourcePage<Snapshot, String>> {
        let output = self
            .client
            .describe_snapshots()
            .owner_ids(SNAPSHOT_OWNER)
            .set_next_token(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("DescribeSnapshots", &e))?;

        let snapshots = output
            .snapshots()
            .iter()
            .filter_map(|snapshot| snapshot.snapshot_id())
            .map(Snapshot::new)
            .collect();

        Ok(ResourcePage::new(snapshots, next_cursor(output.next_token())))
    }
}

#[async_trait]
impl ResourceDeleter<Snapshot> for Ec2Snapshots {
    async fn delete(&self, item: &Snapshot) -> DeletionOutcome {
        deletion_outcome(
            self.client
                .delete_snapshot()
                .snapshot_id(&item.id)
                .send()
                .await,
        )
    }
}

/// Instances are terminated one by one; the ids are kept so that the volume
/// pass can wait for them to finish terminating
pub struct Ec2Instances {
    client: Client,
    max_wait: Duration,
    terminated: Mutex<Vec<String>>,
}

impl Ec2Instances {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_wait: DEFAULT_TERMINATION_WAIT,
            terminated: Mutex::new(Vec::new()),
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    fn take_terminated(&self) -> Vec<String> {
        std::mem::take(&mut *self.terminated.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn live_state_filter() -> Filter {
    Filter::builder()
        .name("instance-state-name")
        .set_values(Some(
            LIVE_INSTANCE_STATES.iter().map(|s| s.to_string()).collect(),
        ))
        .build()
}

#[async_trait]
impl PageSource for Ec2Instances {
    type Item = Instance;
    type Cursor = String;

    async fn fetch_page(&self, cursor: Option<&String>) -> Result<ResourcePage<Instance, String>> {
        let output = self
            .client
            .describe_instances()
            .filters(live_state_filter())
            .set_next_token(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("DescribeInstances", &e))?;

        let instances = output
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .filter_map(|instance| instance.instance_id())
            .map(Instance::new)
            .collect();

        Ok(ResourcePage::new(instances, next_cursor(output.next_token())))
    }
}

#[async_trait]
impl ResourceDeleter<Instance> for Ec2Instances {
    async fn delete(&self, item: &Instance) -> DeletionOutcome {
        let outcome = deletion_outcome(
            self.client
                .terminate_instances()
                .instance_ids(&item.id)
                .send()
                .await,
        );
        if outcome.is_deleted() {
            self.terminated
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(item.id.clone());
        }
        outcome
    }
}

#[async_trait]
impl TerminationWaiter for Ec2Instances {
    async fn wait_for_termination(&self) -> Result<()> {
        let ids = self.take_terminated();
        if ids.is_empty() {
            return Ok(());
        }

        tracing::debug!("Waiting up to {:?} for {:?}", self.max_wait, ids);
        self.client
            .wait_until_instance_terminated()
            .set_instance_ids(Some(ids))
            .wait(self.max_wait)
            .await
            .map_err(|e| {
                CloudError::ApiError(format!(
                    "instances not terminated after {:?}: {}",
                    self.max_wait, e
                ))
            })?;

        Ok(())
    }
}

pub struct Ec2Volumes {
    client: Client,
}

impl Ec2Volumes {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for Ec2Volumes {
    type Item = Volume;
    type Cursor = String;

    async fn fetch_page(&self, cursor: Option<&String>) -> Result<ResourcePage<Volume, String>> {
        let output = self
            .client
            .describe_volumes()
            .set_next_token(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("DescribeVolumes", &e))?;

        let volumes = output
            .volumes()
            .iter()
            .filter_map(|volume| volume.volume_id())
            .map(Volume::new)
            .collect();

        Ok(ResourcePage::new(volumes, next_cursor(output.next_token())))
    }
}

#[async_trait]
impl ResourceDeleter<Volume> for Ec2Volumes {
    /// Attached volumes fail with `VolumeInUse` and stay in the report
    async fn delete(&self, item: &Volume) -> DeletionOutcome {
        deletion_outcome(self.client.delete_volume().volume_id(&item.id).send().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::config::{BehaviorVersion, Credentials, Region};

    fn instances() -> Ec2Instances {
        let config = aws_sdk_ec2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::from_static("us-east-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .build();
        Ec2Instances::new(Client::from_conf(config))
    }

    #[test]
    fn test_listing_skips_instances_already_going_away() {
        let filter = live_state_filter();

        assert_eq!(filter.name(), Some("instance-state-name"));
        assert!(filter.values().iter().all(|v| v != "terminated"));
        assert!(filter.values().iter().all(|v| v != "shutting-down"));
        assert!(filter.values().contains(&"stopped".to_string()));
    }

    #[test]
    fn test_termination_wait_is_bounded() {
        assert_eq!(instances().max_wait, Duration::from_secs(300));
        assert_eq!(
            instances().with_max_wait(Duration::from_secs(30)).max_wait,
            Duration::from_secs(30)
        );
    }

    #[tokio::test]
    async fn test_wait_without_terminations_makes_no_call() {
        // a DescribeInstances call could not succeed offline
        let instances = instances();
        assert!(instances.wait_for_termination().await.is_ok());
        assert!(instances.take_terminated().is_empty());
    }
}
