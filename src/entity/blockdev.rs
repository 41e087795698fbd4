use serde::{
    Deserialize,
    Serialize,
};

use super::volume::VolumeRecord;

/// Device class label as reported by lsblk `TYPE`.
///
/// Anything other than disk, partition or LVM logical volume
/// (loop, rom, crypt, raid...) is kept as `Unsupported`,
/// and freezing it is a no-op.
#[derive(Debug, PartialEq, Eq, std::hash::Hash, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockDeviceType {
    Disk,
    Partition,
    Lvm,
    Unsupported(String),
}

// Type aliases
pub const TYPE_DISK: BlockDeviceType = BlockDeviceType::Disk;
pub const TYPE_PART: BlockDeviceType = BlockDeviceType::Partition;
pub const TYPE_LVM: BlockDeviceType = BlockDeviceType::Lvm;

impl From<&str> for BlockDeviceType {
    fn from(label: &str) -> Self {
        match label {
            "disk" => TYPE_DISK,
            "part" => TYPE_PART,
            "lvm" => TYPE_LVM,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for BlockDeviceType {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<BlockDeviceType> for String {
    fn from(dev_type: BlockDeviceType) -> Self {
        dev_type.to_string()
    }
}

impl std::fmt::Display for BlockDeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disk => write!(f, "disk"),
            Self::Partition => write!(f, "part"),
            Self::Lvm => write!(f, "lvm"),
            Self::Unsupported(label) => write!(f, "{label}"),
        }
    }
}

/// One distinct mountable block device (disk, partition or LV),
/// with the cloud volumes backing it.
///
/// An LV spanning several disks has one entry in `physical_devices`
/// per disk/partition path leading to it. Entries are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountUnit {
    // Empty if not mounted, [SWAP] for active swap
    pub mountpoint: String,

    #[serde(rename = "filesystemType")]
    pub filesystem_type: String,

    #[serde(rename = "blockDevice")]
    pub block_device: String,

    #[serde(rename = "blockDeviceType")]
    pub block_device_type: BlockDeviceType,

    #[serde(rename = "physicalDevices")]
    pub physical_devices: Vec<VolumeRecord>,
}

impl MountUnit {
    /// Pseudo mountpoints such as lsblk's `[SWAP]` do not count
    pub fn is_mounted(&self) -> bool {
        self.mountpoint.starts_with('/')
    }

    /// Distinct volume IDs backing this unit, in discovery order.
    /// Placeholder records are skipped.
    pub fn volumes(&self) -> Vec<&VolumeRecord> {
        let mut seen = std::collections::HashSet::new();

        self.physical_devices
            .iter()
            .filter(|v| !v.is_placeholder())
            .filter(|v| seen.insert(v.volume_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_device_type() {
        let tests = vec![
            ("disk", TYPE_DISK),
            ("part", TYPE_PART),
            ("lvm", TYPE_LVM),
            ("loop", BlockDeviceType::Unsupported("loop".into())),
            ("", BlockDeviceType::Unsupported("".into())),
        ];

        for (label, expected) in tests {
            let dev_type = BlockDeviceType::from(label);
            assert_eq!(dev_type, expected);
            assert_eq!(dev_type.to_string(), label);
        }
    }

    #[test]
    fn test_volumes_dedup() {
        let vol = |id: &str| {
            VolumeRecord {
                volume_id: id.into(),
                ..Default::default()
            }
        };

        let unit = MountUnit {
            mountpoint: "/data".into(),
            filesystem_type: "xfs".into(),
            block_device: "/dev/mapper/vg-data".into(),
            block_device_type: TYPE_LVM,
            physical_devices: vec![vol("vol-1"), VolumeRecord::default(), vol("vol-2"), vol("vol-1")],
        };

        let ids: Vec<&str> = unit.volumes().iter().map(|v| v.volume_id.as_str()).collect();
        assert_eq!(ids, vec!["vol-1", "vol-2"]);

        assert!(unit.is_mounted());
        let swap = MountUnit {
            mountpoint: "[SWAP]".into(),
            ..unit.clone()
        };
        assert!(!swap.is_mounted());

        let json = serde_json::to_value(&unit).expect("failed to serialize unit");
        assert_eq!(json["blockDeviceType"], "lvm");
        assert_eq!(json["physicalDevices"].as_array().map(|a| a.len()), Some(4));
    }
}
