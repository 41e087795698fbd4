use std::fs;
use std::path::Path;

use crate::constants::{
    DEVICE_PREFIXES,
    LEGACY_BOOT_ALIAS,
    LEGACY_ROOT_ALIAS,
};
use crate::errors::SnapError;

/// Detects the kernel's block device naming scheme by listing `sys_block`
/// (normally /sys/block), returning the first of `sd`, `xvd` that prefixes
/// any device name there.
///
/// Failure is always fatal: guessing a scheme would map cloud volumes
/// onto the wrong local disks.
pub fn detect_prefix<P>(sys_block: P) -> Result<&'static str, SnapError>
where
    P: AsRef<Path>,
{
    let sys_block = sys_block.as_ref();
    let entries = fs::read_dir(sys_block).map_err(|err| {
        SnapError::PrefixNotDetected(format!(
            "failed to read {}: {err}",
            sys_block.display()
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            SnapError::PrefixNotDetected(format!(
                "failed to read entry in {}: {err}",
                sys_block.display()
            ))
        })?;

        names.push(entry.file_name().to_string_lossy().to_string());
    }

    detect_prefix_from_names(&names).ok_or_else(|| {
        SnapError::PrefixNotDetected(format!(
            "none of {DEVICE_PREFIXES:?} found in {}",
            sys_block.display()
        ))
    })
}

pub fn detect_prefix_from_names<S>(names: &[S]) -> Option<&'static str>
where
    S: AsRef<str>,
{
    DEVICE_PREFIXES
        .into_iter()
        .find(|prefix| names.iter().any(|name| name.as_ref().starts_with(prefix)))
}

/// Maps a cloud-reported attachment device (e.g. /dev/sdf) to the local
/// kernel device name under naming scheme `prefix` (e.g. xvdf).
///
/// The cloud-side directory is stripped, only the base name is returned.
/// Names outside both schemes are returned unchanged.
///
/// Not idempotent across schemes, so translate a raw name exactly once.
pub fn translate(raw_device: &str, prefix: &str) -> String {
    translate_known(raw_device, prefix).unwrap_or_else(|| raw_device.to_string())
}

/// Like [`translate`], but a name outside both schemes
/// is a [`SnapError::DeviceTranslation`].
pub fn translate_strict(raw_device: &str, prefix: &str) -> Result<String, SnapError> {
    let base = base_name(raw_device);
    if !DEVICE_PREFIXES.iter().any(|scheme| base.starts_with(scheme)) {
        return Err(SnapError::DeviceTranslation(format!(
            "attachment device {raw_device} matches none of {DEVICE_PREFIXES:?}"
        )));
    }

    Ok(translate(raw_device, prefix))
}

/// Last path component of `device`, e.g. /dev/xvdf => xvdf
pub fn base_name(device: &str) -> &str {
    match device.rsplit_once('/') {
        Some((_dir, base)) => base,
        None => device,
    }
}

fn translate_known(raw_device: &str, prefix: &str) -> Option<String> {
    let base = match base_name(raw_device) {
        LEGACY_ROOT_ALIAS if prefix == "xvd" => LEGACY_BOOT_ALIAS,
        base => base,
    };

    // Longest scheme first so that xvd* never falls into sd*
    let suffix = base
        .strip_prefix("xvd")
        .or_else(|| base.strip_prefix("sd"))?;

    Some(format!("{prefix}{suffix}"))
}
