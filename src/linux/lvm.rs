use crate::errors::SnapError;
use crate::utils::shell;

/// Suspends I/O on an LVM logical volume. Executes:
/// ```shell
/// dmsetup suspend ${{ lv }}
/// ```
pub fn suspend_lv(cmd_dmsetup: &str, lv: &str) -> Result<(), SnapError> {
    shell::exec(cmd_dmsetup, &["suspend", lv])
}

/// Executes:
/// ```shell
/// dmsetup resume ${{ lv }}
/// ```
pub fn resume_lv(cmd_dmsetup: &str, lv: &str) -> Result<(), SnapError> {
    shell::exec(cmd_dmsetup, &["resume", lv])
}
