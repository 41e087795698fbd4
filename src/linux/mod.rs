pub mod device;
pub mod fsfreeze;
pub mod lsblk;
pub mod lvm;
pub mod user;

use crate::config::Config;
use crate::errors::SnapError;

/// OS primitives for quiescing writes before a snapshot.
///
/// Every call is a single attempt. Implementations must not retry.
pub trait FreezeOps {
    fn freeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError>;
    fn unfreeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError>;
    fn suspend_logical_volume(&self, device: &str) -> Result<(), SnapError>;
    fn resume_logical_volume(&self, device: &str) -> Result<(), SnapError>;
}

impl<T: FreezeOps + ?Sized> FreezeOps for &T {
    fn freeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError> {
        (**self).freeze_filesystem(mountpoint)
    }

    fn unfreeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError> {
        (**self).unfreeze_filesystem(mountpoint)
    }

    fn suspend_logical_volume(&self, device: &str) -> Result<(), SnapError> {
        (**self).suspend_logical_volume(device)
    }

    fn resume_logical_volume(&self, device: &str) -> Result<(), SnapError> {
        (**self).resume_logical_volume(device)
    }
}

/// The host's block layer, driven through util-linux and device-mapper programs
#[derive(Debug, Clone)]
pub struct Linux {
    cmd_lsblk: String,
    cmd_fsfreeze: String,
    cmd_dmsetup: String,
}

impl Linux {
    pub fn new(config: &Config) -> Self {
        Self {
            cmd_lsblk: config.commands.lsblk.clone(),
            cmd_fsfreeze: config.commands.fsfreeze.clone(),
            cmd_dmsetup: config.commands.dmsetup.clone(),
        }
    }

    pub fn list_block_devices(&self) -> Result<lsblk::DiskEnumeration, SnapError> {
        lsblk::list_block_devices(&self.cmd_lsblk)
    }
}

impl FreezeOps for Linux {
    fn freeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError> {
        fsfreeze::freeze(&self.cmd_fsfreeze, mountpoint)
    }

    fn unfreeze_filesystem(&self, mountpoint: &str) -> Result<(), SnapError> {
        fsfreeze::unfreeze(&self.cmd_fsfreeze, mountpoint)
    }

    fn suspend_logical_volume(&self, device: &str) -> Result<(), SnapError> {
        lvm::suspend_lv(&self.cmd_dmsetup, device)
    }

    fn resume_logical_volume(&self, device: &str) -> Result<(), SnapError> {
        lvm::resume_lv(&self.cmd_dmsetup, device)
    }
}
