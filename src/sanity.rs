use std::path::Path;

use crate::config::Config;
use crate::linux::user::is_root;
use crate::utils::shell::in_path;

/// Returns warnings about the environment a snapshot would run in.
/// None of these are fatal: the programs may still be resolvable,
/// and freezing may be allowed by capabilities rather than uid 0.
pub fn check(config: &Config) -> Vec<String> {
    let mut warnings = missing_programs(config)
        .into_iter()
        .map(|program| format!("no such program: {program}"))
        .collect::<Vec<_>>();

    if !is_root() {
        warnings.push("not running as root, freezing filesystems will likely fail".to_string());
    }

    warnings
}

fn missing_programs(config: &Config) -> Vec<&str> {
    let programs = [
        config.commands.aws.as_str(),
        config.commands.lsblk.as_str(),
        config.commands.fsfreeze.as_str(),
        config.commands.dmsetup.as_str(),
    ];

    programs
        .into_iter()
        .filter(|program| !program_exists(program))
        .collect()
}

fn program_exists(program: &str) -> bool {
    match program.contains('/') {
        true => Path::new(program).exists(),
        false => in_path(program),
    }
}
