pub mod coordinator;
pub mod topology;

use crate::aws::{
    SnapshotHandle,
    SnapshotInfo,
    SnapshotRequester,
};
use crate::entity::blockdev::MountUnit;
use crate::entity::tags::TagMap;
use crate::errors::SnapError;
use crate::linux::FreezeOps;

use self::coordinator::Coordinator;

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub description: String,
    // Applied over each volume's own tags
    pub tags: TagMap,
    pub dry_run: bool,
}

/// Takes one snapshot per distinct volume backing `unit`
/// while the unit is frozen.
///
/// No snapshot is requested if suspending fails. Resume is always
/// attempted once suspend was, even if suspend or a snapshot failed.
/// Snapshot requests stop at the first failure.
pub fn snapshot_unit<F, R>(
    coordinator: &Coordinator<F>,
    requester: &R,
    unit: &MountUnit,
    opts: &SnapshotOptions,
) -> Result<Vec<SnapshotHandle>, SnapError>
where
    F: FreezeOps,
    R: SnapshotRequester,
{
    let name = match unit.is_mounted() {
        true => unit.mountpoint.clone(),
        false => unit.block_device.clone(),
    };

    let volumes = unit.volumes();
    if volumes.is_empty() {
        return Err(SnapError::NoVolumes(name));
    }

    if let Err(err) = coordinator.suspend(unit) {
        return Err(SnapError::SnapshotError {
            mountpoint: name,
            error: Box::new(err),
            resume_error: coordinator.resume(unit).err().map(Box::new),
            snapshots_created: Vec::new(),
        });
    }

    let mut snapshots_created = Vec::new();
    let mut snapshot_error = None;

    for volume in volumes {
        let mut tags = volume.tags.clone();
        tags.merge(&opts.tags);

        let info = SnapshotInfo {
            volume_id: volume.volume_id.clone(),
            description: opts.description.clone(),
            tags,
            dry_run: opts.dry_run,
        };

        match requester.create_snapshot(&info) {
            Ok(handle) => snapshots_created.push(handle),
            Err(err) => {
                snapshot_error = Some(err);
                break;
            }
        }
    }

    match (snapshot_error, coordinator.resume(unit)) {
        (None, Ok(())) => Ok(snapshots_created),
        (Some(err), resume_result) => {
            Err(SnapError::SnapshotError {
                mountpoint: name,
                error: Box::new(err),
                resume_error: resume_result.err().map(Box::new),
                snapshots_created,
            })
        }
        (None, Err(err)) => {
            Err(SnapError::SnapshotError {
                mountpoint: name,
                error: Box::new(err),
                resume_error: None,
                snapshots_created,
            })
        }
    }
}
