use crate::errors::SnapError;
use crate::utils::shell;

/// Executes:
/// ```shell
/// fsfreeze --freeze ${{ mountpoint }}
/// ```
pub fn freeze(cmd_fsfreeze: &str, mountpoint: &str) -> Result<(), SnapError> {
    shell::exec(cmd_fsfreeze, &["--freeze", mountpoint])
}

/// Executes:
/// ```shell
/// fsfreeze --unfreeze ${{ mountpoint }}
/// ```
pub fn unfreeze(cmd_fsfreeze: &str, mountpoint: &str) -> Result<(), SnapError> {
    shell::exec(cmd_fsfreeze, &["--unfreeze", mountpoint])
}
