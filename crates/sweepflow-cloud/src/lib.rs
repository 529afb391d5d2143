//! SweepFlow cleanup core
//!
//! This crate holds the provider-neutral part of account cleanup: listing
//! every page of a resource family, deleting item by item, and counting what
//! was really deleted.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Orchestrator                    │
//! │   assume role → buckets → snapshots → instances  │
//! │                → volumes → hosted zones          │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ScopedCredentials
//! ┌─────────────────▼───────────────────────────────┐
//! │            ResourceTypeCleaner (per family)      │
//! │  ┌────────────┐ ┌───────────┐ ┌──────────────┐  │
//! │  │PagedLister │ │ PreDelete │ │ResourceDelete│  │
//! │  └────────────┘ └───────────┘ └──────────────┘  │
//! │   (BucketEmptier, RecordSetPurger as hooks)      │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  aws provider │
//! └───────────────┘
//! ```

pub mod account;
pub mod cleaner;
pub mod deleter;
pub mod dns;
pub mod error;
pub mod objects;
pub mod orchestrator;
pub mod page;
pub mod provider;
pub mod report;
pub mod resource;
pub mod retry;

// Re-exports
pub use account::{AccountId, ScopedCredentials};
pub use cleaner::ResourceTypeCleaner;
pub use deleter::{DeletionOutcome, NoPreDelete, PreDelete, ResourceDeleter};
pub use dns::{Change, ChangeAction, ChangeBatch, DnsService, RecordSetPurger, ZoneRecordSets};
pub use error::{CloudError, Result};
pub use objects::{BucketEmptier, BucketObjects, ObjectFailure, ObjectStore};
pub use orchestrator::Orchestrator;
pub use page::{PageSource, PagedLister, ResourcePage};
pub use provider::{AccountServices, RoleAssumer, ServiceConnector, TerminationWaiter};
pub use report::{CleanupReport, DeletionTally, FailedDeletion, TypeReport};
pub use resource::{
    Bucket, HostedZone, Instance, PROTECTED_RECORD_TYPES, RecordSet, Resource, ResourceItem,
    ResourceKind, STRUCTURAL_RECORD_COUNT, Snapshot, Volume,
};
pub use retry::RetryPolicy;
