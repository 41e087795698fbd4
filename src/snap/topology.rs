use std::collections::HashMap;

use crate::constants::FSTYPE_LVM_MEMBER;
use crate::entity::blockdev::{
    BlockDeviceType,
    MountUnit,
};
use crate::entity::volume::VolumeRecord;
use crate::linux::device;
use crate::linux::lsblk::{
    BlockEntry,
    DiskEnumeration,
};

/// Groups the OS block devices into mount units, one per distinct
/// block device, in enumeration order.
///
/// A disk and every device stacked on it share the disk's volume record.
/// Each time a block device is seen, that record is appended to its unit,
/// so an LV spanning several disks collects one record per disk.
/// Records are not deduplicated. Disks with no matching volume get a
/// zero-valued placeholder record.
///
/// LVM physical volumes are not mountable and get no unit of their own.
pub fn build(enumeration: &DiskEnumeration, volumes: &[VolumeRecord]) -> Vec<MountUnit> {
    let mut units: Vec<MountUnit> = Vec::new();

    // Block device => index into units
    let mut seen = HashMap::<String, usize>::new();

    for d in &enumeration.disks {
        let volume = find_volume(volumes, &d.disk.device);
        let entries = std::iter::once(&d.disk).chain(d.parts.iter());

        for entry in entries {
            if is_lvm_member(entry) {
                continue;
            }

            let i = *seen.entry(entry.device.clone()).or_insert_with(|| {
                units.push(new_unit(entry));
                units.len() - 1
            });

            units[i].physical_devices.push(volume.clone());
        }
    }

    units
}

/// Returns the unit mounted at `mountpoint`, which must be an absolute path.
/// Trailing slashes are ignored, except for `/` itself.
pub fn find_mountpoint<'a>(units: &'a [MountUnit], mountpoint: &str) -> Option<&'a MountUnit> {
    // Rules out lsblk pseudo mountpoints like [SWAP]
    if !mountpoint.starts_with('/') {
        return None;
    }

    let mountpoint = normalize(mountpoint);

    units
        .iter()
        .find(|unit| unit.is_mounted() && normalize(&unit.mountpoint) == mountpoint)
}

fn normalize(mountpoint: &str) -> &str {
    match mountpoint.trim_end_matches('/') {
        "" if mountpoint.starts_with('/') => "/",
        trimmed => trimmed,
    }
}

// First match wins. Records carry bare kernel names (xvdf),
// lsblk reports full paths (/dev/xvdf).
fn find_volume(volumes: &[VolumeRecord], device: &str) -> VolumeRecord {
    let name = device::base_name(device);
    volumes
        .iter()
        .find(|v| device::base_name(&v.device) == name)
        .cloned()
        .unwrap_or_default()
}

fn is_lvm_member(entry: &BlockEntry) -> bool {
    entry.fstype == FSTYPE_LVM_MEMBER
}

fn new_unit(entry: &BlockEntry) -> MountUnit {
    MountUnit {
        mountpoint: entry.mountpoint.clone(),
        filesystem_type: entry.fstype.clone(),
        block_device: entry.device.clone(),
        block_device_type: BlockDeviceType::from(entry.dtype.as_str()),
        physical_devices: Vec::new(),
    }
}
