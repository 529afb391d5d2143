//! Resource families and the items listed for each of them

use std::fmt;

/// Record types every hosted zone carries and which can never be deleted
pub const PROTECTED_RECORD_TYPES: [&str; 2] = ["NS", "SOA"];

/// Number of record sets a freshly created zone already holds (one NS, one SOA)
pub const STRUCTURAL_RECORD_COUNT: i64 = 2;

/// Resource family handled by one cleaner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Bucket,
    Object,
    Snapshot,
    Instance,
    Volume,
    HostedZone,
    RecordSet,
}

impl ResourceKind {
    /// Plural label used in summary lines
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "S3 Buckets",
            ResourceKind::Object => "Objects",
            ResourceKind::Snapshot => "Snapshots",
            ResourceKind::Instance => "EC2 Instances",
            ResourceKind::Volume => "EBS Volumes",
            ResourceKind::HostedZone => "Zones",
            ResourceKind::RecordSet => "Records",
        }
    }

    /// Singular label used in failure lines
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "S3 Bucket",
            ResourceKind::Object => "object",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Instance => "instance",
            ResourceKind::Volume => "volume",
            ResourceKind::HostedZone => "zone",
            ResourceKind::RecordSet => "record set",
        }
    }

    /// Family of the entries removed by this family's pre-delete hook
    pub fn dependent(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Bucket => Some(ResourceKind::Object),
            ResourceKind::HostedZone => Some(ResourceKind::RecordSet),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Object => "object",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Instance => "instance",
            ResourceKind::Volume => "volume",
            ResourceKind::HostedZone => "hosted-zone",
            ResourceKind::RecordSet => "record-set",
        };
        f.write_str(s)
    }
}

/// A listed item that can be deleted by a cleaner
pub trait Resource: fmt::Debug + Send + Sync {
    const KIND: ResourceKind;

    /// The value passed to the delete call
    fn identity(&self) -> &str;

    fn to_item(&self) -> ResourceItem;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,

    /// Region the bucket lives in, when the listing reported it
    pub region: Option<String>,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl Resource for Bucket {
    const KIND: ResourceKind = ResourceKind::Bucket;

    fn identity(&self) -> &str {
        &self.name
    }

    fn to_item(&self) -> ResourceItem {
        ResourceItem::Bucket {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub id: String,
}

impl Volume {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Resource for Volume {
    const KIND: ResourceKind = ResourceKind::Volume;

    fn identity(&self) -> &str {
        &self.id
    }

    fn to_item(&self) -> ResourceItem {
        ResourceItem::Volume {
            id: self.id.clone(),
        }
    }
}

/// A compute instance that is not yet shutting down or terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
}

impl Instance {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Resource for Instance {
    const KIND: ResourceKind = ResourceKind::Instance;

    fn identity(&self) -> &str {
        &self.id
    }

    fn to_item(&self) -> ResourceItem {
        ResourceItem::Instance {
            id: self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: String,
}

impl Snapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Resource for Snapshot {
    const KIND: ResourceKind = ResourceKind::Snapshot;

    fn identity(&self) -> &str {
        &self.id
    }

    fn to_item(&self) -> ResourceItem {
        ResourceItem::Snapshot {
            id: self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
    /// Record set count as reported by the zone listing
    pub record_set_count: i64,
}

impl HostedZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, record_set_count: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_set_count,
        }
    }

    /// Whether the zone holds anything beyond its structural NS and SOA records
    pub fn needs_record_purge(&self) -> bool {
        self.record_set_count > STRUCTURAL_RECORD_COUNT
    }
}

impl Resource for HostedZone {
    const KIND: ResourceKind = ResourceKind::HostedZone;

    fn identity(&self) -> &str {
        &self.id
    }

    fn to_item(&self) -> ResourceItem {
        ResourceItem::HostedZone {
            id: self.id.clone(),
            record_set_count: self.record_set_count,
        }
    }
}

/// One record set of a hosted zone
///
/// `data` is the provider's own representation of the record, handed back
/// verbatim in the change batch that deletes it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<D> {
    pub name: String,
    pub record_type: String,
    pub data: D,
}

impl<D> RecordSet<D> {
    pub fn new(name: impl Into<String>, record_type: impl Into<String>, data: D) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            data,
        }
    }

    pub fn is_protected(&self) -> bool {
        PROTECTED_RECORD_TYPES
            .iter()
            .any(|protected| self.record_type.eq_ignore_ascii_case(protected))
    }
}

/// Identity of any item the cleaners touch, used in reports and log lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceItem {
    Bucket { name: String },
    Instance { id: String },
    Volume { id: String },
    Snapshot { id: String },
    HostedZone { id: String, record_set_count: i64 },
    RecordSet { name: String, record_type: String },
}

impl ResourceItem {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceItem::Bucket { .. } => ResourceKind::Bucket,
            ResourceItem::Instance { .. } => ResourceKind::Instance,
            ResourceItem::Volume { .. } => ResourceKind::Volume,
            ResourceItem::Snapshot { .. } => ResourceKind::Snapshot,
            ResourceItem::HostedZone { .. } => ResourceKind::HostedZone,
            ResourceItem::RecordSet { .. } => ResourceKind::RecordSet,
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            ResourceItem::Bucket { name } => name,
            ResourceItem::Instance { id } => id,
            ResourceItem::Volume { id } => id,
            ResourceItem::Snapshot { id } => id,
            ResourceItem::HostedZone { id, .. } => id,
            ResourceItem::RecordSet { name, .. } => name,
        }
    }
}

impl<D> From<&RecordSet<D>> for ResourceItem {
    fn from(record: &RecordSet<D>) -> Self {
        ResourceItem::RecordSet {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
        }
    }
}

impl fmt::Display for ResourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceItem::RecordSet { name, record_type } => {
                write!(f, "{} {} {}", self.kind(), record_type, name)
            }
            _ => write!(f, "{} {}", self.kind(), self.identity()),
        }
    }
}
