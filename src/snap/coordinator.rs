use crate::entity::blockdev::{
    BlockDeviceType,
    MountUnit,
};
use crate::errors::SnapError;
use crate::linux::FreezeOps;

/// Freezes and thaws mount units around a snapshot.
///
/// A unit goes Active -> Freezing -> Frozen on a successful [`suspend`],
/// and back to Active after [`resume`]. A failed suspend leaves the
/// unit in an unknown state: callers must not snapshot it, and should
/// still call [`resume`].
///
/// The coordinator keeps no state and does not retry. Callers must pair
/// suspend/resume on the same unit and serialize calls per block device.
///
/// [`suspend`]: Coordinator::suspend
/// [`resume`]: Coordinator::resume
pub struct Coordinator<F: FreezeOps> {
    ops: F,
}

impl<F: FreezeOps> Coordinator<F> {
    pub fn new(ops: F) -> Self {
        Self { ops }
    }

    /// Filesystem freeze for disks and partitions mounted at an absolute path,
    /// I/O suspension for LVs, no-op for everything else.
    pub fn suspend(&self, unit: &MountUnit) -> Result<(), SnapError> {
        let result = match unit.block_device_type {
            BlockDeviceType::Disk | BlockDeviceType::Partition => {
                match unit.is_mounted() {
                    true => self.ops.freeze_filesystem(&unit.mountpoint),
                    false => Ok(()),
                }
            }
            BlockDeviceType::Lvm => self.ops.suspend_logical_volume(&unit.block_device),
            BlockDeviceType::Unsupported(_) => Ok(()),
        };

        result.map_err(|err| {
            SnapError::FreezePrimitive {
                device: unit.block_device.clone(),
                error: Box::new(err),
            }
        })
    }

    /// Undoes [`suspend`](Coordinator::suspend) with the matching primitive.
    pub fn resume(&self, unit: &MountUnit) -> Result<(), SnapError> {
        let result = match unit.block_device_type {
            BlockDeviceType::Disk | BlockDeviceType::Partition => {
                match unit.is_mounted() {
                    true => self.ops.unfreeze_filesystem(&unit.mountpoint),
                    false => Ok(()),
                }
            }
            BlockDeviceType::Lvm => self.ops.resume_logical_volume(&unit.block_device),
            BlockDeviceType::Unsupported(_) => Ok(()),
        };

        result.map_err(|err| {
            SnapError::ResumePrimitive {
                device: unit.block_device.clone(),
                error: Box::new(err),
            }
        })
    }
}
