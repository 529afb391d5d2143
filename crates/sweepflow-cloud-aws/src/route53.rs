//! Route53 hosted zones and their record sets

use crate::error::{deletion_outcome, listing_failed};
use crate::next_cursor;
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{self as r53, ResourceRecordSet, RrType};
use sweepflow_cloud::{
    ChangeAction, ChangeBatch, DeletionOutcome, DnsService, HostedZone, PageSource, RecordSet,
    ResourceDeleter, ResourcePage, Result,
};

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Where ListResourceRecordSets resumes
///
/// Route53 pages records by (name, type, set identifier) rather than by an
/// opaque token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCursor {
    pub name: String,
    pub record_type: RrType,
    pub identifier: Option<String>,
}

pub struct Route53Zones {
    client: Client,
}

impl Route53Zones {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn submit(
        &self,
        zone: &HostedZone,
        batch: &ChangeBatch<ResourceRecordSet>,
    ) -> DeletionOutcome {
        let change_batch = match sdk_change_batch(zone, batch) {
            Ok(change_batch) => change_batch,
            Err(e) => return DeletionOutcome::failed(e.to_string()),
        };

        let result = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&zone.id)
            .change_batch(change_batch)
            .send()
            .await;

        if let Some(info) = result.as_ref().ok().and_then(|output| output.change_info()) {
            tracing::debug!(
                "Change {} for {} is {}",
                info.id(),
                zone.name,
                info.status().as_str()
            );
        }

        deletion_outcome(result)
    }
}

fn sdk_change_batch(
    zone: &HostedZone,
    batch: &ChangeBatch<ResourceRecordSet>,
) -> crate::error::Result<r53::ChangeBatch> {
    let changes = batch
        .changes()
        .iter()
        .map(|change| {
            r53::Change::builder()
                .action(sdk_action(change.action))
                .resource_record_set(change.record.data.clone())
                .build()
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(r53::ChangeBatch::builder()
        .comment(format!("account cleanup of {}", zone.name))
        .set_changes(Some(changes))
        .build()?)
}

#[async_trait]
impl PageSource for Route53Zones {
    type Item = HostedZone;
    type Cursor = String;

    async fn fetch_page(&self, cursor: Option<&String>) -> Result<ResourcePage<HostedZone, String>> {
        let output = self
            .client
            .list_hosted_zones()
            .set_marker(cursor.cloned())
            .send()
            .await
            .map_err(|e| listing_failed("ListHostedZones", &e))?;

        let zones = output
            .hosted_zones()
            .iter()
            .map(|zone| {
                HostedZone::new(
                    short_zone_id(zone.id()),
                    zone.name(),
                    // unknown count: list the records to find out
                    zone.resource_record_set_count().unwrap_or(i64::MAX),
                )
            })
            .collect();

        let next = if output.is_truncated() {
            next_cursor(output.next_marker())
        } else {
            None
        };

        Ok(ResourcePage::new(zones, next))
    }
}

#[async_trait]
impl ResourceDeleter<HostedZone> for Route53Zones {
    async fn delete(&self, item: &HostedZone) -> DeletionOutcome {
        deletion_outcome(self.client.delete_hosted_zone().id(&item.id).send().await)
    }
}

#[async_trait]
impl DnsService for Route53Zones {
    type RecordData = ResourceRecordSet;
    type RecordCursor = RecordCursor;

    async fn list_record_sets(
        &self,
        zone: &HostedZone,
        cursor: Option<&RecordCursor>,
    ) -> Result<ResourcePage<RecordSet<ResourceRecordSet>, RecordCursor>> {
        let mut request = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&zone.id);
        if let Some(cursor) = cursor {
            request = request
                .start_record_name(&cursor.name)
                .start_record_type(cursor.record_type.clone())
                .set_start_record_identifier(cursor.identifier.clone());
        }

        let output = request
            .send()
            .await
            .map_err(|e| listing_failed("ListResourceRecordSets", &e))?;

        let records = output
            .resource_record_sets()
            .iter()
            .map(|record| {
                RecordSet::new(record.name(), record.r#type().as_str(), record.clone())
            })
            .collect();

        let next = match (output.next_record_name(), output.next_record_type()) {
            (Some(name), Some(record_type)) if output.is_truncated() => Some(RecordCursor {
                name: name.to_string(),
                record_type: record_type.clone(),
                identifier: output.next_record_identifier().map(str::to_string),
            }),
            _ => None,
        };

        Ok(ResourcePage::new(records, next))
    }

    async fn change_record_sets(
        &self,
        zone: &HostedZone,
        batch: &ChangeBatch<ResourceRecordSet>,
    ) -> DeletionOutcome {
        self.submit(zone, batch).await
    }
}

fn sdk_action(action: ChangeAction) -> r53::ChangeAction {
    match action {
        ChangeAction::Delete => r53::ChangeAction::Delete,
    }
}

/// `/hostedzone/Z123` → `Z123`
fn short_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id)
}
