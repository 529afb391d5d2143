//! S3 buckets and their objects
//!
//! ListBuckets returns the buckets of every region, while object and bucket
//! calls have to be sent to the bucket's own region. Each bucket is therefore
//! handled through a client for its region, built once and reused.

use crate::error::{AwsError, deletion_outcome, describe, listing_failed};
use crate::next_cursor;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::{BucketLocationConstraint, Delete, ObjectIdentifier};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use sweepflow_cloud::{
    Bucket, DeletionOutcome, ObjectFailure, ObjectStore, PageSource, ResourceDeleter,
    ResourcePage, Result,
};

/// Region of buckets whose location constraint is empty
const LEGACY_DEFAULT_REGION: &str = "us-east-1";

pub struct S3Buckets {
    client: Client,
    /// Clients keyed by region
    regional: Mutex<HashMap<String, Client>>,
    /// Regions found through GetBucketLocation, keyed by bucket name
    located: Mutex<HashMap<String, String>>,
}

impl S3Buckets {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            regional: Mutex::new(HashMap::new()),
            located: Mutex::new(HashMap::new()),
        }
    }

    /// Client for the region `bucket` lives in
    async fn client_for(&self, bucket: &Bucket) -> Client {
        let region = match &bucket.region {
            Some(region) => Some(region.clone()),
            None => self.locate(&bucket.name).await,
        };

        match region {
            Some(region) => self.regional_client(&region),
            None => self.client.clone(),
        }
    }

    /// Ask S3 where a bucket lives when the listing did not say
    async fn locate(&self, bucket: &str) -> Option<String> {
        let known = self
            .located
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(bucket)
            .cloned();
        if known.is_some() {
            return known;
        }

        match self.client.get_bucket_location().bucket(bucket).send().await {
            Ok(output) => {
                let region = location_region(output.location_constraint()).to_string();
                self.located
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(bucket.to_string(), region.clone());
                Some(region)
            }
            Err(e) => {
                tracing::debug!("Failed locating S3 Bucket {}: {}", bucket, describe(&e));
                None
            }
        }
    }

    fn regional_client(&self, region: &str) -> Client {
        let home = self.client.config().region().map(|r| r.as_ref());
        if home == Some(region) {
            return self.client.clone();
        }

        let mut clients = self
            .regional
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        clients
            .entry(region.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating S3 client for {}", region);
                let config = self
                    .client
                    .config()
                    .to_builder()
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(config)
            })
            .clone()
    }
}

/// Region named by a GetBucketLocation answer
///
/// Buckets in us-east-1 report no constraint, and some old eu-west-1 buckets
/// still report `EU`.
pub fn location_region(constraint: Option<&BucketLocationConstraint>) -> &str {
    match constraint.map(BucketLocationConstraint::as_str) {
        None | Some("") => LEGACY_DEFAULT_REGION,
        Some("EU") => "eu-west-1",
        Some(region) => region,
    }
}

#[async_trait]
impl PageSource for S3Buckets {
    type Item = Bucket;
    type Cursor = String;

    async fn fetch_page(&self, cursor: Option<&String>) -> Result<ResourcePage<Bucket, String>> {
        let output = self
            .client
            .list_buckets()
            .set_continuation_token(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("ListBuckets", &e))?;

        let buckets = output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?;
                Some(match bucket.bucket_region() {
                    Some(region) => Bucket::new(name).with_region(region),
                    None => Bucket::new(name),
                })
            })
            .collect();

        Ok(ResourcePage::new(buckets, next_cursor(output.continuation_token())))
    }
}

#[async_trait]
impl ResourceDeleter<Bucket> for S3Buckets {
    async fn delete(&self, item: &Bucket) -> DeletionOutcome {
        let client = self.client_for(item).await;
        deletion_outcome(client.delete_bucket().bucket(&item.name).send().await)
    }
}

#[async_trait]
impl ObjectStore for S3Buckets {
    type ObjectCursor = String;

    async fn list_objects(
        &self,
        bucket: &Bucket,
        cursor: Option<&String>,
    ) -> Result<ResourcePage<String, String>> {
        let output = self
            .client_for(bucket)
            .await
            .list_objects_v2()
            .bucket(&bucket.name)
            .set_continuation_token(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("ListObjectsV2", &e))?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(str::to_string)
            .collect();

        Ok(ResourcePage::new(keys, next_cursor(output.next_continuation_token())))
    }

    async fn delete_objects(&self, bucket: &Bucket, keys: &[String]) -> Result<Vec<ObjectFailure>> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(AwsError::from)?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(AwsError::from)?;

        let output = self
            .client_for(bucket)
            .await
            .delete_objects()
            .bucket(&bucket.name)
            .delete(delete)
            .send()
            .await
            .map_err(|e| AwsError::Api(describe(&e)))?;

        // quiet mode only reports failures
        Ok(output
            .errors()
            .iter()
            .map(|error| {
                ObjectFailure::new(
                    error.key().unwrap_or("<unknown>"),
                    error.code().unwrap_or("unknown error"),
                )
            })
            .collect())
    }
}
