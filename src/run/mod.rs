pub mod mounts;
pub mod snapshot;
pub mod tag;
pub mod volumes;

use colored::Colorize;

use crate::aws::catalog::VolumeCatalog;
use crate::aws::ec2::AwsCli;
use crate::aws::metadata::MetadataClient;
use crate::cli;
use crate::config::Config;
use crate::entity::blockdev::MountUnit;
use crate::errors::SnapError;
use crate::linux::Linux;
use crate::snap::topology;

pub fn run(cli_args: cli::Cli) -> Result<(), SnapError> {
    let mut config = load_config(&cli_args)?;
    let dry_run = cli_args.dry_run;

    match cli_args.commands {
        // Default is to list mounts
        None | Some(cli::Commands::Mounts) => mounts::run(&mut config),
        Some(cli::Commands::Volumes) => volumes::run(&mut config),
        Some(cli::Commands::Snapshot(args_snapshot)) => {
            let report = snapshot::run(&mut config, args_snapshot, dry_run)?;
            println!("{}", report.to_json_string());

            Ok(())
        }
        Some(cli::Commands::Tag(args_tag)) => tag::run(&mut config, args_tag, dry_run),
    }
}

// CLI flags override config file
fn load_config(cli_args: &cli::Cli) -> Result<Config, SnapError> {
    let mut config = Config::load(cli_args.config.as_deref())?;

    if let Some(ref instance_id) = cli_args.instance_id {
        config.instance_id = Some(instance_id.clone());
    }

    if let Some(ref region) = cli_args.region {
        config.region = Some(region.clone());
    }

    Ok(config)
}

/// Fills in instance ID and region from instance metadata if unset.
///
/// A missing instance ID is an error. A missing region is left for
/// the aws program to resolve from its own configuration.
fn resolve_instance(config: &mut Config) -> Result<String, SnapError> {
    if let (Some(instance_id), Some(_)) = (&config.instance_id, &config.region) {
        return Ok(instance_id.clone());
    }

    let metadata = MetadataClient::new(config);
    let reachable = metadata.available();

    if reachable {
        resolve_region(config, &metadata);
    }

    if let Some(ref instance_id) = config.instance_id {
        return Ok(instance_id.clone());
    }

    if !reachable {
        return Err(SnapError::Metadata(format!(
            "no instance id given, and metadata endpoint {} is unreachable",
            config.metadata.endpoint
        )));
    }

    let instance_id = metadata.instance_id()?;
    config.instance_id = Some(instance_id.clone());

    Ok(instance_id)
}

// Left unset on failure, for the aws program to resolve from its own configuration
fn resolve_region(config: &mut Config, metadata: &MetadataClient) {
    if config.region.is_some() {
        return;
    }

    match metadata.region() {
        Ok(region) => config.region = Some(region),
        Err(err) => eprintln!("{}", format!("WARN: region not resolved: {err}").yellow()),
    }
}

/// Queries attached volumes and the OS block devices,
/// returning the instance ID and its mount units
fn discover(config: &mut Config, linux: &Linux) -> Result<(String, Vec<MountUnit>), SnapError> {
    let instance_id = resolve_instance(config)?;

    let catalog = VolumeCatalog::new(AwsCli::new(config), &config.sys_block);
    let volumes = catalog.list_attached(&instance_id)?;
    let enumeration = linux.list_block_devices()?;

    Ok((instance_id, topology::build(&enumeration, &volumes)))
}

fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, SnapError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| SnapError::SnapRsBug(format!("failed to serialize output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_load_config_overrides() {
        let cli_args = cli::Cli::try_parse_from(["ec2-snap", "-i", "i-0abc", "-r", "us-west-2", "volumes"])
            .expect("failed to parse args");

        let config = load_config(&cli_args).expect("failed to load config");
        assert_eq!(config.instance_id.as_deref(), Some("i-0abc"));
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_resolve_instance_given() {
        let mut config = Config::default();
        config.instance_id = Some("i-0abc".into());
        config.region = Some("us-west-2".into());

        assert_eq!(resolve_instance(&mut config).expect("failed to resolve"), "i-0abc");
    }

    #[test]
    fn test_resolve_instance_unreachable() {
        let mut config = Config::default();
        config.metadata.endpoint = "http://127.0.0.1:9/latest".into();

        match resolve_instance(&mut config) {
            Err(SnapError::Metadata(_)) => {}
            result => panic!("unexpected result {result:?}"),
        }

        // Region is optional
        config.instance_id = Some("i-0abc".into());
        assert_eq!(resolve_instance(&mut config).expect("failed to resolve"), "i-0abc");
        assert!(config.region.is_none());
    }
}
