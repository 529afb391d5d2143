//! AWS provider for SweepFlow
//!
//! Implements the cleanup traits of `sweepflow-cloud` on top of the AWS SDK:
//!
//! - [`StsRoleAssumer`]: assumes the cleanup role in the target account
//! - [`AwsConnector`]: builds S3, EC2 and Route53 clients from the scoped
//!   credentials
//! - [`S3Buckets`], [`Ec2Snapshots`], [`Ec2Instances`], [`Ec2Volumes`],
//!   [`Route53Zones`]: listing and delete calls per family
//!
//! # Example
//!
//! ```ignore
//! use sweepflow_cloud::{AccountId, Orchestrator, RetryPolicy};
//! use sweepflow_cloud_aws::{AwsConnector, StsRoleAssumer};
//!
//! let assumer = StsRoleAssumer::new("us-east-1").with_profile(Some("osd-staging-1".into()));
//! let orchestrator = Orchestrator::new(assumer, AwsConnector::new(RetryPolicy::no_retry()));
//!
//! let report = orchestrator.run(&AccountId::parse("123456789012")?).await?;
//! for line in report.types.iter().map(|t| t.summary_line()) {
//!     println!("{}", line);
//! }
//! ```

pub mod ec2;
pub mod error;
pub mod provider;
pub mod route53;
pub mod s3;
pub mod sts;

pub use ec2::{
    DEFAULT_TERMINATION_WAIT, Ec2Instances, Ec2Snapshots, Ec2Volumes, LIVE_INSTANCE_STATES,
    SNAPSHOT_OWNER,
};
pub use error::{AwsError, Result};
pub use provider::{AwsConnector, AwsServices, sdk_retry_config};
pub use route53::{RecordCursor, Route53Zones};
pub use s3::{S3Buckets, location_region};
pub use sts::{
    DEFAULT_DURATION_SECS, DEFAULT_REGION, DEFAULT_ROLE_NAME, DEFAULT_SESSION_NAME, StsRoleAssumer,
};

/// Pagination token of the next page, if any
///
/// Some EC2 calls answer with an empty token on the last page.
pub(crate) fn next_cursor(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(str::to_string)
}
