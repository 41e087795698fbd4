use thiserror::Error;

use crate::aws::SnapshotHandle;
use crate::utils::shell::CmdError;

#[derive(Debug, Error)]
pub enum SnapError {
    #[error("no such file {1}: {0}")]
    NoSuchFile(std::io::Error, String),

    #[error("bad config: {0}")]
    BadConfig(String),

    #[error("bad cli arguments: {0}")]
    BadArgs(String),

    #[error("{context}: {error}")]
    CmdFailed { error: CmdError, context: String },

    /// The OS block device naming scheme is neither `sd*` nor `xvd*`,
    /// or /sys/block could not be read.
    #[error("device prefix could not be detected: {0}")]
    PrefixNotDetected(String),

    /// Transport or auth failure talking to the cloud provider.
    /// The only error callers may retry.
    #[error("provider query failed: {0}")]
    ProviderQuery(String),

    #[error("device translation failed: {0}")]
    DeviceTranslation(String),

    #[error("block device enumeration failed: {0}")]
    BlockDevices(String),

    #[error("failed to suspend {device}: {error}")]
    FreezePrimitive {
        device: String,
        error: Box<SnapError>,
    },

    #[error("failed to resume {device}: {error}")]
    ResumePrimitive {
        device: String,
        error: Box<SnapError>,
    },

    #[error("instance metadata error: {0}")]
    Metadata(String),

    #[error("no such mountpoint: {0}")]
    NoSuchMountpoint(String),

    #[error("no cloud volumes back mountpoint {0}")]
    NoVolumes(String),

    #[error("snapshot of {mountpoint} failed: {error}")]
    SnapshotError {
        mountpoint: String,
        error: Box<SnapError>,
        resume_error: Option<Box<SnapError>>,
        snapshots_created: Vec<SnapshotHandle>,
    },

    #[error("ec2-snap-rs bug: {0}")]
    SnapRsBug(String),
}
