//! Target account identity and the credentials scoped to it

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Canonical length of an AWS account id
const ACCOUNT_ID_LEN: usize = 12;

/// Identifier of the account being cleaned up
///
/// Always stored in its canonical zero-padded 12 digit form so that ids
/// with leading zeros survive a round trip through the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CloudError::InvalidAccountId(
                "account id must not be empty".to_string(),
            ));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CloudError::InvalidAccountId(format!(
                "'{}' contains non-digit characters",
                trimmed
            )));
        }
        if trimmed.len() > ACCOUNT_ID_LEN {
            return Err(CloudError::InvalidAccountId(format!(
                "'{}' is longer than {} digits",
                trimmed, ACCOUNT_ID_LEN
            )));
        }

        Ok(Self(format!("{:0>width$}", trimmed, width = ACCOUNT_ID_LEN)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ARN of `role_name` inside this account
    pub fn role_arn(&self, role_name: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", self.0, role_name)
    }
}

impl FromStr for AccountId {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Temporary credentials obtained by assuming the cleanup role
///
/// Read-only once issued. Never serialized.
#[derive(Clone)]
pub struct ScopedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ScopedCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            region: region.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

impl fmt::Debug for ScopedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
