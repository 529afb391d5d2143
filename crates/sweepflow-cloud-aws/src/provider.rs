//! Client construction from scoped credentials

use crate::ec2::{Ec2Instances, Ec2Snapshots, Ec2Volumes};
use crate::route53::Route53Zones;
use crate::s3::S3Buckets;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use std::time::SystemTime;
use sweepflow_cloud::{AccountServices, Result, RetryPolicy, ScopedCredentials, ServiceConnector};

const CREDENTIALS_PROVIDER_NAME: &str = "sweepflow-assumed-role";

/// Builds S3, EC2 and Route53 clients bound to the assumed role
#[derive(Debug, Clone, Default)]
pub struct AwsConnector {
    retry: RetryPolicy,
}

impl AwsConnector {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl ServiceConnector for AwsConnector {
    type Services = AwsServices;

    async fn connect(&self, credentials: &ScopedCredentials) -> Result<AwsServices> {
        self.retry.validate()?;

        let provider = aws_sdk_s3::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            credentials.expires_at.map(SystemTime::from),
            CREDENTIALS_PROVIDER_NAME,
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .retry_config(sdk_retry_config(&self.retry))
            .load()
            .await;

        tracing::debug!(
            "Connected AWS clients in {} (max attempts {})",
            credentials.region,
            self.retry.max_attempts
        );

        let ec2 = aws_sdk_ec2::Client::new(&config);
        Ok(AwsServices {
            buckets: S3Buckets::new(aws_sdk_s3::Client::new(&config)),
            snapshots: Ec2Snapshots::new(ec2.clone()),
            instances: Ec2Instances::new(ec2.clone()),
            volumes: Ec2Volumes::new(ec2),
            zones: Route53Zones::new(aws_sdk_route53::Client::new(&config)),
        })
    }
}

pub struct AwsServices {
    buckets: S3Buckets,
    snapshots: Ec2Snapshots,
    instances: Ec2Instances,
    volumes: Ec2Volumes,
    zones: Route53Zones,
}

impl AccountServices for AwsServices {
    type Buckets = S3Buckets;
    type Snapshots = Ec2Snapshots;
    type Instances = Ec2Instances;
    type Volumes = Ec2Volumes;
    type Zones = Route53Zones;

    fn buckets(&self) -> &S3Buckets {
        &self.buckets
    }

    fn snapshots(&self) -> &Ec2Snapshots {
        &self.snapshots
    }

    fn instances(&self) -> &Ec2Instances {
        &self.instances
    }

    fn volumes(&self) -> &Ec2Volumes {
        &self.volumes
    }

    fn zones(&self) -> &Route53Zones {
        &self.zones
    }
}

/// Translate the cleanup retry knob into SDK retry settings
pub fn sdk_retry_config(policy: &RetryPolicy) -> RetryConfig {
    if !policy.retries_enabled() {
        return RetryConfig::disabled();
    }

    RetryConfig::standard()
        .with_max_attempts(policy.max_attempts)
        .with_initial_backoff(policy.initial_backoff)
        .with_max_backoff(policy.max_backoff)
}
