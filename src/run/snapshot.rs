use std::collections::HashSet;

use colored::Colorize;

use crate::aws::ec2::AwsCli;
use crate::aws::{
    SnapshotHandle,
    SnapshotRequester,
};
use crate::cli::ArgsSnapshot;
use crate::config::Config;
use crate::entity::blockdev::MountUnit;
use crate::entity::report::{
    MountpointReport,
    Report,
};
use crate::errors::SnapError;
use crate::linux::{
    FreezeOps,
    Linux,
};
use crate::sanity;
use crate::snap::coordinator::Coordinator;
use crate::snap::{
    self,
    topology,
    SnapshotOptions,
};

pub(super) fn run(config: &mut Config, args: ArgsSnapshot, dry_run: bool) -> Result<Report, SnapError> {
    let start = std::time::Instant::now();

    for warning in sanity::check(config) {
        eprintln!("{}", format!("WARN: {warning}").yellow());
    }

    let linux = Linux::new(config);
    let (instance_id, units) = super::discover(config, &linux)?;

    // Every mountpoint must resolve to a backed unit before anything is frozen
    let selected = select_units(&units, &args.mountpoints)?;
    let opts = snapshot_options(config, args, dry_run)?;

    let coordinator = Coordinator::new(&linux);
    let requester = AwsCli::new(config);
    let (mountpoints, result) = snapshot_units(&coordinator, &requester, &selected, &opts);

    let report = Report {
        instance_id,
        mountpoints,
        duration: start.elapsed(),
    };

    if let Err(err) = result {
        // Snapshots taken before the failure still go to stdout
        println!("{}", report.to_json_string());
        return Err(err);
    }

    Ok(report)
}

/// Resolves `mountpoints` to their units, dropping repeats of the same block device.
/// Units with no cloud volume behind them are rejected.
fn select_units<'a>(units: &'a [MountUnit], mountpoints: &[String]) -> Result<Vec<&'a MountUnit>, SnapError> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for mountpoint in mountpoints {
        let unit = topology::find_mountpoint(units, mountpoint)
            .ok_or_else(|| SnapError::NoSuchMountpoint(mountpoint.clone()))?;

        if unit.volumes().is_empty() {
            return Err(SnapError::NoVolumes(mountpoint.clone()));
        }

        if seen.insert(unit.block_device.as_str()) {
            selected.push(unit);
        }
    }

    Ok(selected)
}

// CLI description replaces the configured one, CLI tags are applied over configured tags
fn snapshot_options(config: &Config, args: ArgsSnapshot, dry_run: bool) -> Result<SnapshotOptions, SnapError> {
    let mut tags = config.snapshot.tags.clone();
    for tag in &args.tags {
        tags.insert_pair(tag)?;
    }

    Ok(SnapshotOptions {
        description: args
            .description
            .unwrap_or_else(|| config.snapshot.description.clone()),
        tags,
        dry_run,
    })
}

/// Snapshots units one at a time, stopping at the first failure.
///
/// Reports are returned on failure too, including the snapshots
/// the failed unit managed to create.
fn snapshot_units<F, R>(
    coordinator: &Coordinator<F>,
    requester: &R,
    units: &[&MountUnit],
    opts: &SnapshotOptions,
) -> (Vec<MountpointReport>, Result<(), SnapError>)
where
    F: FreezeOps,
    R: SnapshotRequester,
{
    let mut reports = Vec::new();

    for unit in units {
        let snapshots = match snap::snapshot_unit(coordinator, requester, unit, opts) {
            Ok(snapshots) => snapshots,
            Err(err) => {
                if let SnapError::SnapshotError { snapshots_created, .. } = &err {
                    if !snapshots_created.is_empty() {
                        reports.push(mountpoint_report(unit, snapshots_created.clone()));
                    }
                }

                return (reports, Err(err));
            }
        };

        eprintln!(
            "{}",
            format!(
                "snapshotted {} ({}): {} snapshot(s)",
                unit.mountpoint,
                unit.block_device,
                snapshots.len()
            )
            .green()
        );

        reports.push(mountpoint_report(unit, snapshots));
    }

    (reports, Ok(()))
}

fn mountpoint_report(unit: &MountUnit, snapshots: Vec<SnapshotHandle>) -> MountpointReport {
    MountpointReport {
        mountpoint: unit.mountpoint.clone(),
        block_device: unit.block_device.clone(),
        snapshots,
    }
}
