//! Role assumption through STS

use crate::error::{AwsError, describe};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::{DateTime, Utc};
use sweepflow_cloud::{AccountId, Result, RoleAssumer, ScopedCredentials};

pub const DEFAULT_ROLE_NAME: &str = "OrganizationAccountAccessRole";
pub const DEFAULT_SESSION_NAME: &str = "SREAdminReuseCleanup";
pub const DEFAULT_REGION: &str = "us-east-1";
/// STS minimum, in seconds
pub const DEFAULT_DURATION_SECS: i32 = 900;

/// Assumes the cleanup role in a target account from a base identity
///
/// The base identity comes from the default credential chain, or from a named
/// profile when one is set.
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    profile: Option<String>,
    region: String,
    role_name: String,
    session_name: String,
    duration_secs: i32,
}

impl Default for StsRoleAssumer {
    fn default() -> Self {
        Self {
            profile: None,
            region: DEFAULT_REGION.to_string(),
            role_name: DEFAULT_ROLE_NAME.to_string(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl StsRoleAssumer {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = role_name.into();
        self
    }

    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    pub fn with_duration_secs(mut self, duration_secs: i32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    async fn base_config(&self) -> SdkConfig {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        loader.load().await
    }

    async fn assume(&self, account: &AccountId) -> crate::error::Result<ScopedCredentials> {
        let config = self.base_config().await;
        let client = aws_sdk_sts::Client::new(&config);

        match client.get_caller_identity().send().await {
            Ok(identity) => tracing::debug!(
                "Base identity: {} (account {})",
                identity.arn().unwrap_or("unknown"),
                identity.account().unwrap_or("unknown")
            ),
            Err(e) => tracing::debug!("Could not resolve base identity: {}", describe(&e)),
        }

        let role_arn = account.role_arn(&self.role_name);
        tracing::debug!(
            "Assuming {} as session {} for {}s",
            role_arn,
            self.session_name,
            self.duration_secs
        );

        let output = client
            .assume_role()
            .role_arn(&role_arn)
            .role_session_name(&self.session_name)
            .duration_seconds(self.duration_secs)
            .send()
            .await
            .map_err(|e| AwsError::RoleAssumption {
                role_arn: role_arn.clone(),
                reason: describe(&e),
            })?;

        let credentials = output
            .credentials()
            .ok_or_else(|| AwsError::MissingCredentials(role_arn.clone()))?;

        let scoped = ScopedCredentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            credentials.session_token(),
            &self.region,
        );

        Ok(match to_utc(credentials.expiration()) {
            Some(expiry) => scoped.with_expiry(expiry),
            None => scoped,
        })
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(&self, account: &AccountId) -> Result<ScopedCredentials> {
        Ok(self.assume(account).await?)
    }
}

fn to_utc(time: &aws_sdk_sts::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}
