use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::SnapError;
use crate::utils::shell;

/// One block device as seen by the OS
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub device: String,
    pub fstype: String,
    // Empty if not mounted
    pub mountpoint: String,
    // lsblk TYPE, e.g. disk, part, lvm
    pub dtype: String,
}

/// A top-level disk and every device stacked on it
/// (partitions, and LVs or other holders on those), depth-first.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskEntry {
    pub disk: BlockEntry,
    pub parts: Vec<BlockEntry>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskEnumeration {
    pub disks: Vec<DiskEntry>,
}

// For parsing `lsblk --json` output
#[derive(Deserialize)]
struct OutputLsblk {
    blockdevices: Vec<EntryLsblk>,
}

#[derive(Deserialize)]
struct EntryLsblk {
    name: String,
    fstype: Option<String>,
    mountpoint: Option<String>,

    #[serde(rename = "type")]
    dev_type: Option<String>,

    #[serde(default)]
    children: Vec<EntryLsblk>,
}

impl From<&EntryLsblk> for BlockEntry {
    fn from(entry: &EntryLsblk) -> Self {
        Self {
            device: entry.name.clone(),
            fstype: entry.fstype.clone().unwrap_or_default(),
            mountpoint: entry.mountpoint.clone().unwrap_or_default(),
            dtype: entry.dev_type.clone().unwrap_or_default(),
        }
    }
}

/// Executes:
/// ```shell
/// lsblk --json --paths --output NAME,FSTYPE,MOUNTPOINT,TYPE
/// ```
pub fn list_block_devices(cmd_lsblk: &str) -> Result<DiskEnumeration, SnapError> {
    let output = shell::exec_output(
        cmd_lsblk,
        &["--json", "--paths", "--output", "NAME,FSTYPE,MOUNTPOINT,TYPE"],
        &[],
    )
    .map_err(|err| SnapError::BlockDevices(err.to_string()))?;

    parse_lsblk(&output)
}

pub fn parse_lsblk(output_lsblk: &str) -> Result<DiskEnumeration, SnapError> {
    let output: OutputLsblk = serde_json::from_str(output_lsblk)
        .map_err(|err| SnapError::BlockDevices(format!("bad lsblk json: {err}")))?;

    let disks = output
        .blockdevices
        .iter()
        .map(|entry| {
            let mut parts = Vec::new();
            collect_children(&entry.children, &mut parts);

            DiskEntry {
                disk: entry.into(),
                parts,
            }
        })
        .collect();

    Ok(DiskEnumeration { disks })
}

fn collect_children(children: &[EntryLsblk], parts: &mut Vec<BlockEntry>) {
    for child in children {
        parts.push(child.into());
        collect_children(&child.children, parts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT_LSBLK: &str = r#"{
   "blockdevices": [
      {"name":"/dev/xvda", "fstype":null, "mountpoint":null, "type":"disk",
         "children": [
            {"name":"/dev/xvda1", "fstype":"ext4", "mountpoint":"/", "type":"part"}
         ]
      },
      {"name":"/dev/xvdf", "fstype":"LVM2_member", "mountpoint":null, "type":"disk",
         "children": [
            {"name":"/dev/mapper/data-lv", "fstype":"xfs", "mountpoint":"/data", "type":"lvm"}
         ]
      },
      {"name":"/dev/xvdg", "fstype":null, "mountpoint":null, "type":"disk",
         "children": [
            {"name":"/dev/xvdg1", "fstype":"LVM2_member", "mountpoint":null, "type":"part",
               "children": [
                  {"name":"/dev/mapper/data-lv", "fstype":"xfs", "mountpoint":"/data", "type":"lvm"}
               ]
            },
            {"name":"/dev/xvdg2", "fstype":null, "mountpoint":null, "type":"part"}
         ]
      },
      {"name":"/dev/loop0", "fstype":"squashfs", "mountpoint":"/snap/core/1", "type":"loop"}
   ]
}"#;

    #[test]
    fn test_parse_lsblk() {
        let enumeration = parse_lsblk(OUTPUT_LSBLK).expect("failed to parse lsblk output");
        assert_eq!(enumeration.disks.len(), 4);

        let root = &enumeration.disks[0];
        assert_eq!(root.disk, BlockEntry {
            device: "/dev/xvda".into(),
            fstype: "".into(),
            mountpoint: "".into(),
            dtype: "disk".into(),
        });
        assert_eq!(root.parts, vec![BlockEntry {
            device: "/dev/xvda1".into(),
            fstype: "ext4".into(),
            mountpoint: "/".into(),
            dtype: "part".into(),
        }]);

        // Grandchildren are flattened depth-first
        let devices: Vec<&str> = enumeration.disks[2]
            .parts
            .iter()
            .map(|p| p.device.as_str())
            .collect();
        assert_eq!(devices, vec!["/dev/xvdg1", "/dev/mapper/data-lv", "/dev/xvdg2"]);

        let loop0 = &enumeration.disks[3];
        assert!(loop0.parts.is_empty());
        assert_eq!(loop0.disk.dtype, "loop");
    }

    #[test]
    fn test_parse_lsblk_bad_output() {
        for output in ["", "{}", "not json", r#"{"blockdevices": [{"fstype": "ext4"}]}"#] {
            match parse_lsblk(output) {
                Err(SnapError::BlockDevices(_)) => {}
                result => panic!("unexpected result from {output}: {result:?}"),
            }
        }
    }

    #[ignore]
    #[test]
    fn test_list_block_devices() {
        let enumeration = list_block_devices("lsblk").expect("failed to run lsblk");
        assert!(!enumeration.disks.is_empty());
    }
}
