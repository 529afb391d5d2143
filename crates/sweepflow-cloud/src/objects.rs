//! Bucket emptying
//!
//! A bucket can only be deleted once it holds no objects. [`BucketEmptier`]
//! pages through the objects of a bucket and removes each page with one batch
//! request. It is plugged into the bucket cleaner as its pre-delete hook.

use crate::deleter::PreDelete;
use crate::error::Result;
use crate::page::{PageSource, PagedLister, ResourcePage};
use crate::resource::Bucket;
use async_trait::async_trait;
use std::fmt::Debug;

/// A key that a batch delete did not remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFailure {
    pub key: String,
    pub reason: String,
}

impl ObjectFailure {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Object operations of a storage provider
#[async_trait]
pub trait ObjectStore: Send + Sync {
    type ObjectCursor: Clone + Debug + PartialEq + Send + Sync;

    /// One page of object keys in `bucket`
    async fn list_objects(
        &self,
        bucket: &Bucket,
        cursor: Option<&Self::ObjectCursor>,
    ) -> Result<ResourcePage<String, Self::ObjectCursor>>;

    /// Delete `keys` in one request
    ///
    /// `Ok` carries the keys the provider refused; `Err` means the request as
    /// a whole was rejected.
    async fn delete_objects(&self, bucket: &Bucket, keys: &[String]) -> Result<Vec<ObjectFailure>>;
}

/// The object keys of one bucket, as a [`PageSource`]
pub struct BucketObjects<'a, S> {
    store: &'a S,
    bucket: &'a Bucket,
}

impl<'a, S: ObjectStore> BucketObjects<'a, S> {
    pub fn new(store: &'a S, bucket: &'a Bucket) -> Self {
        Self { store, bucket }
    }
}

#[async_trait]
impl<'a, S: ObjectStore> PageSource for BucketObjects<'a, S> {
    type Item = String;
    type Cursor = S::ObjectCursor;

    async fn fetch_page(
        &self,
        cursor: Option<&Self::Cursor>,
    ) -> Result<ResourcePage<String, Self::Cursor>> {
        self.store.list_objects(self.bucket, cursor).await
    }
}

/// Removes every object of a bucket
pub struct BucketEmptier<'a, S> {
    store: &'a S,
}

impl<'a, S: ObjectStore> BucketEmptier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Empty `bucket` page by page and return the number of objects removed
    ///
    /// Refused keys are not counted. A listing error or a rejected batch
    /// stops emptying this bucket; its delete call is still made afterwards.
    pub async fn empty(&self, bucket: &Bucket) -> u64 {
        let source = BucketObjects::new(self.store, bucket);
        let mut lister = PagedLister::new(&source);
        let mut removed = 0u64;

        loop {
            let page = match lister.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed listing objects of {}: {}", bucket.name, e);
                    break;
                }
            };

            if page.items.is_empty() {
                continue;
            }

            match self.store.delete_objects(bucket, &page.items).await {
                Ok(failures) => {
                    for failure in &failures {
                        tracing::warn!(
                            "Failed deleting object {} in {}: {}",
                            failure.key,
                            bucket.name,
                            failure.reason
                        );
                    }
                    removed += page.items.len().saturating_sub(failures.len()) as u64;
                }
                Err(e) => {
                    tracing::warn!("Failed deleting objects in {}: {}", bucket.name, e);
                    break;
                }
            }
        }

        if removed > 0 {
            tracing::debug!("Objects deleted: {} ({})", removed, bucket.name);
        }
        removed
    }
}

#[async_trait]
impl<'a, S: ObjectStore> PreDelete<Bucket> for BucketEmptier<'a, S> {
    async fn before_delete(&self, bucket: &Bucket) -> u64 {
        self.empty(bucket).await
    }
}
