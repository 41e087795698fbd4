use serde::Deserialize;
use serde_json::json;

use super::{
    ProviderVolume,
    SnapshotHandle,
    SnapshotInfo,
    SnapshotRequester,
    TagInfo,
    VolumeProvider,
};
use crate::config::Config;
use crate::constants::ENV_AWS_MAX_ATTEMPTS;
use crate::errors::SnapError;
use crate::utils::shell;

// Error code the EC2 API returns for a dry run that would have succeeded
const DRY_RUN_OPERATION: &str = "DryRunOperation";
const RESOURCE_TYPE_SNAPSHOT: &str = "snapshot";

/// EC2 client backed by the `aws` program.
///
/// Credentials, endpoint and retry backoff are left to the program;
/// only region, profile and max attempts are passed down.
#[derive(Debug, Clone)]
pub struct AwsCli {
    cmd: String,
    region: Option<String>,
    profile: Option<String>,
    max_attempts: u32,
}

// For parsing `aws ec2 describe-volumes` output
#[derive(Deserialize)]
struct OutputDescribeVolumes {
    #[serde(rename = "Volumes", default)]
    volumes: Vec<ProviderVolume>,
}

impl AwsCli {
    pub fn new(config: &Config) -> Self {
        Self {
            cmd: config.commands.aws.clone(),
            region: config.region.clone(),
            profile: config.profile.clone(),
            max_attempts: config.max_attempts,
        }
    }

    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut result = vec!["ec2"];
        result.extend_from_slice(args);

        if let Some(ref region) = self.region {
            result.extend(["--region", region.as_str()]);
        }

        if let Some(ref profile) = self.profile {
            result.extend(["--profile", profile.as_str()]);
        }

        result.extend(["--output", "json"]);
        result
    }

    fn exec(&self, args: &[&str]) -> Result<String, SnapError> {
        shell::exec_output(&self.cmd, &self.args(args), &[(
            ENV_AWS_MAX_ATTEMPTS,
            self.max_attempts.to_string(),
        )])
    }
}

impl VolumeProvider for AwsCli {
    /// Executes:
    /// ```shell
    /// aws ec2 describe-volumes --filters Name=attachment.instance-id,Values=${{ instance_id }}
    /// ```
    fn query_attached_volumes(&self, instance_id: &str) -> Result<Vec<ProviderVolume>, SnapError> {
        let filter = format!("Name=attachment.instance-id,Values={instance_id}");
        let output = self
            .exec(&["describe-volumes", "--filters", filter.as_str()])
            .map_err(|err| SnapError::ProviderQuery(err.to_string()))?;

        parse_describe_volumes(&output)
    }
}

impl SnapshotRequester for AwsCli {
    /// Executes:
    /// ```shell
    /// aws ec2 create-snapshot --volume-id ${{ volume_id }} --description ${{ description }} \
    ///     --tag-specifications ${{ tags }} [--dry-run]
    /// ```
    fn create_snapshot(&self, info: &SnapshotInfo) -> Result<SnapshotHandle, SnapError> {
        let tag_specs = tag_specifications(info);
        let mut args = vec![
            "create-snapshot",
            "--volume-id",
            info.volume_id.as_str(),
            "--description",
            info.description.as_str(),
            "--tag-specifications",
            tag_specs.as_str(),
        ];

        if info.dry_run {
            args.push("--dry-run");
        }

        match self.exec(&args) {
            Ok(output) => parse_create_snapshot(&output),
            Err(err) if info.dry_run && is_dry_run_ok(&err) => {
                Ok(SnapshotHandle {
                    snapshot_id: String::new(),
                    volume_id: info.volume_id.clone(),
                    state: "dry-run".to_string(),
                })
            }
            Err(err) => Err(SnapError::ProviderQuery(err.to_string())),
        }
    }

    /// Executes:
    /// ```shell
    /// aws ec2 create-tags --resources ${{ resource }} --tags ${{ tags }} [--dry-run]
    /// ```
    fn create_tags(&self, info: &TagInfo) -> Result<(), SnapError> {
        let tags = info.tags.to_ec2_json().to_string();
        let mut args = vec![
            "create-tags",
            "--resources",
            info.resource.as_str(),
            "--tags",
            tags.as_str(),
        ];

        if info.dry_run {
            args.push("--dry-run");
        }

        match self.exec(&args) {
            Ok(_) => Ok(()),
            Err(err) if info.dry_run && is_dry_run_ok(&err) => Ok(()),
            Err(err) => Err(SnapError::ProviderQuery(err.to_string())),
        }
    }
}

fn parse_describe_volumes(output: &str) -> Result<Vec<ProviderVolume>, SnapError> {
    let output: OutputDescribeVolumes = serde_json::from_str(output).map_err(|err| {
        SnapError::ProviderQuery(format!("bad describe-volumes output: {err}"))
    })?;

    Ok(output.volumes)
}

fn parse_create_snapshot(output: &str) -> Result<SnapshotHandle, SnapError> {
    serde_json::from_str(output).map_err(|err| {
        SnapError::ProviderQuery(format!("bad create-snapshot output: {err}"))
    })
}

fn tag_specifications(info: &SnapshotInfo) -> String {
    json!([{
        "ResourceType": RESOURCE_TYPE_SNAPSHOT,
        "Tags": info.tags.to_ec2_json(),
    }])
    .to_string()
}

fn is_dry_run_ok(err: &SnapError) -> bool {
    match err {
        SnapError::CmdFailed { error, .. } => {
            error
                .stderr()
                .map(|stderr| stderr.contains(DRY_RUN_OPERATION))
                .unwrap_or(false)
        }
        _ => false,
    }
}
