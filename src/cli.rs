use clap::{
    Args,
    Parser,
    Subcommand,
};

use crate::entity::tags;
use crate::errors::SnapError;

#[derive(Debug, Parser)]
#[clap(
    author = "ec2-snap-rs",
    version,
    about = "Crash-consistent EBS snapshots of mounted filesystems and LVM volumes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Option<Commands>,

    /// Config file (YAML). Defaults to $EC2_SNAP_CONFIG if set
    #[arg(global = true, short = 'c', long = "config", value_parser = validate_filename)]
    pub config: Option<String>,

    /// EC2 instance ID, looked up from instance metadata if omitted
    #[arg(global = true, short = 'i', long = "instance-id")]
    pub instance_id: Option<String>,

    /// AWS region, looked up from instance metadata if omitted
    #[arg(global = true, short = 'r', long = "region")]
    pub region: Option<String>,

    /// Dry-run, ec2-snap will still freeze filesystems,
    /// but snapshot and tag requests are sent with DryRun set
    #[arg(global = true, short = 'n', long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print mount units and their backing volumes (default)
    Mounts,

    /// Print cloud volumes attached to this instance
    Volumes,

    /// Freeze, snapshot, and thaw mountpoints
    Snapshot(ArgsSnapshot),

    /// Tag a cloud resource
    Tag(ArgsTag),
}

#[derive(Debug, Args)]
pub struct ArgsSnapshot {
    /// Mountpoints to snapshot, e.g. / or /data
    #[arg(required = true)]
    pub mountpoints: Vec<String>,

    /// Snapshot description
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,

    /// Extra snapshot tags as KEY=VALUE, may be repeated
    #[arg(short = 't', long = "tag", value_parser = validate_tag)]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ArgsTag {
    /// Resource ID, e.g. snap-0123 or vol-0123
    pub resource: String,

    /// Tags as KEY=VALUE, may be repeated
    #[arg(short = 't', long = "tag", required = true, value_parser = validate_tag)]
    pub tags: Vec<String>,
}

fn validate_filename(name: &str) -> Result<String, SnapError> {
    if name.is_empty() {
        return Err(SnapError::BadArgs(String::from("empty filename")));
    }

    Ok(name.to_string())
}

// Rejects malformed pairs at parse time, callers add them with TagMap::insert_pair
fn validate_tag(key_value: &str) -> Result<String, SnapError> {
    tags::TagMap::new().insert_pair(key_value)?;

    Ok(key_value.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_snapshot() {
        let cli = Cli::try_parse_from([
            "ec2-snap", "-n", "snapshot", "/", "/data", "-t", "env=prod", "--tag", "Name=db", "-d", "nightly",
        ])
        .expect("failed to parse args");

        assert!(cli.dry_run);
        match cli.commands {
            Some(Commands::Snapshot(args)) => {
                assert_eq!(args.mountpoints, vec!["/", "/data"]);
                assert_eq!(args.description.as_deref(), Some("nightly"));
                assert_eq!(args.tags, vec!["env=prod", "Name=db"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_bad_args() {
        let should_err: Vec<Vec<&str>> = vec![
            vec!["ec2-snap", "snapshot"],
            vec!["ec2-snap", "snapshot", "/", "-t", "novalue"],
            vec!["ec2-snap", "tag", "snap-1"],
            vec!["ec2-snap", "-c", "", "mounts"],
        ];

        for args in should_err {
            if Cli::try_parse_from(&args).is_ok() {
                panic!("unexpected ok result from {args:?}");
            }
        }

        let cli = Cli::try_parse_from(["ec2-snap"]).expect("no subcommand should parse");
        assert!(cli.commands.is_none());
    }
}
