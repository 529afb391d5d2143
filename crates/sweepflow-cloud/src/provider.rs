//! Cloud provider traits
//!
//! A provider plugs into the orchestrator with three pieces: a [`RoleAssumer`]
//! that turns an account id into scoped credentials, a [`ServiceConnector`]
//! that builds service clients from those credentials, and the resulting
//! [`AccountServices`], one handle per resource family.

use crate::account::{AccountId, ScopedCredentials};
use crate::deleter::ResourceDeleter;
use crate::dns::DnsService;
use crate::error::Result;
use crate::objects::ObjectStore;
use crate::page::PageSource;
use crate::resource::{Bucket, HostedZone, Instance, Snapshot, Volume};
use async_trait::async_trait;

/// Exchanges an account id for credentials of the cleanup role in that account
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    /// Fails with [`crate::CloudError::RoleAssumption`] when no credentials
    /// can be obtained
    async fn assume_role(&self, account: &AccountId) -> Result<ScopedCredentials>;
}

/// Builds the per-family service handles for one set of credentials
#[async_trait]
pub trait ServiceConnector: Send + Sync {
    type Services: AccountServices;

    async fn connect(&self, credentials: &ScopedCredentials) -> Result<Self::Services>;
}

/// Waits for instance terminations issued during this run to settle
#[async_trait]
pub trait TerminationWaiter: Send + Sync {
    /// Returns once every instance terminated so far has reached the
    /// terminated state. An error means the provider's wait bound ran out or
    /// the state could not be read.
    async fn wait_for_termination(&self) -> Result<()>;
}

/// Service handles for every resource family the orchestrator cleans
pub trait AccountServices: Send + Sync {
    type Buckets: PageSource<Item = Bucket> + ResourceDeleter<Bucket> + ObjectStore;
    type Snapshots: PageSource<Item = Snapshot> + ResourceDeleter<Snapshot>;
    type Instances: PageSource<Item = Instance> + ResourceDeleter<Instance> + TerminationWaiter;
    type Volumes: PageSource<Item = Volume> + ResourceDeleter<Volume>;
    type Zones: PageSource<Item = HostedZone> + ResourceDeleter<HostedZone> + DnsService;

    fn buckets(&self) -> &Self::Buckets;

    fn snapshots(&self) -> &Self::Snapshots;

    fn instances(&self) -> &Self::Instances;

    fn volumes(&self) -> &Self::Volumes;

    fn zones(&self) -> &Self::Zones;
}
