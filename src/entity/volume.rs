use serde::{
    Deserialize,
    Serialize,
};

use super::tags::TagMap;

/// A cloud volume attached to this instance.
///
/// `device` is always in OS-local naming, i.e. already translated
/// from the name the cloud provider reported for the attachment.
///
/// The zero value is used as a placeholder for block devices
/// that are not backed by any known volume.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub device: String,
    pub state: String,

    #[serde(rename = "instanceId")]
    pub instance_id: String,

    #[serde(rename = "volumeId")]
    pub volume_id: String,

    pub tags: TagMap,
}

impl VolumeRecord {
    pub fn is_placeholder(&self) -> bool {
        self.volume_id.is_empty()
    }
}
