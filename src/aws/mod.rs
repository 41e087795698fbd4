pub mod catalog;
pub mod ec2;
pub mod metadata;

use serde::{
    Deserialize,
    Serialize,
};

use crate::entity::tags::TagMap;
use crate::errors::SnapError;

/// A volume as returned by EC2 DescribeVolumes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVolume {
    #[serde(rename = "VolumeId")]
    pub volume_id: String,

    #[serde(rename = "Attachments", default)]
    pub attachments: Vec<ProviderAttachment>,

    #[serde(rename = "Tags", default)]
    pub tags: Vec<ProviderTag>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAttachment {
    // Device name as the cloud sees it, e.g. /dev/sdf
    #[serde(rename = "Device")]
    pub device: String,

    #[serde(rename = "State")]
    pub state: String,

    #[serde(rename = "InstanceId")]
    pub instance_id: String,

    #[serde(rename = "VolumeId")]
    pub volume_id: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTag {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value")]
    pub value: String,
}

/// Properties of the snapshot to take
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub volume_id: String,
    pub description: String,
    pub tags: TagMap,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagInfo {
    pub resource: String,
    pub tags: TagMap,
    pub dry_run: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHandle {
    // Empty on dry runs
    #[serde(rename = "SnapshotId", default)]
    pub snapshot_id: String,

    #[serde(rename = "VolumeId")]
    pub volume_id: String,

    #[serde(rename = "State", default)]
    pub state: String,
}

/// Source of attached volume records.
pub trait VolumeProvider {
    /// Volumes with an attachment to `instance_id`.
    /// Failures are [`SnapError::ProviderQuery`].
    fn query_attached_volumes(&self, instance_id: &str) -> Result<Vec<ProviderVolume>, SnapError>;
}

pub trait SnapshotRequester {
    fn create_snapshot(&self, info: &SnapshotInfo) -> Result<SnapshotHandle, SnapError>;
    fn create_tags(&self, info: &TagInfo) -> Result<(), SnapError>;
}

impl From<&[ProviderTag]> for TagMap {
    /// Provider tags over a `Name` key that defaults to empty
    fn from(tags: &[ProviderTag]) -> Self {
        let mut result = TagMap::with_name();
        for tag in tags {
            result.insert(tag.key.as_str(), tag.value.as_str());
        }

        result
    }
}
