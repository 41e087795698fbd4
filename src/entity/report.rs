use serde::Serialize;
use serde_json::json;

use crate::aws::SnapshotHandle;

/// Summary of one `snapshot` command run
#[derive(Debug)]
pub struct Report {
    pub instance_id: String,
    pub mountpoints: Vec<MountpointReport>,
    pub duration: std::time::Duration,
}

#[derive(Debug, Serialize)]
pub struct MountpointReport {
    pub mountpoint: String,

    #[serde(rename = "blockDevice")]
    pub block_device: String,

    pub snapshots: Vec<SnapshotHandle>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "instanceId": self.instance_id,
            "mountpoints": self.mountpoints,
            "elapsedTime": self.duration,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}
