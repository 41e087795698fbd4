use std::env;

use serde::{
    Deserialize,
    Serialize,
};

use crate::constants::{
    defaults,
    ENV_SNAP_CONFIG,
};
use crate::entity::tags::TagMap;
use crate::errors::SnapError;

/// Runtime configuration, built once at startup and handed to
/// whatever needs it. Unset keys fall back to [`defaults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(alias = "instance-id", alias = "instance")]
    pub instance_id: Option<String>,

    pub region: Option<String>,

    pub profile: Option<String>,

    // Passed on to the aws program as AWS_MAX_ATTEMPTS
    #[serde(alias = "max-attempts", alias = "retries")]
    pub max_attempts: u32,

    #[serde(alias = "sys-block")]
    pub sys_block: String,

    #[serde(alias = "cmd", alias = "programs")]
    pub commands: ConfigCommands,

    pub metadata: ConfigMetadata,

    pub snapshot: ConfigSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigCommands {
    pub aws: String,
    pub lsblk: String,
    pub fsfreeze: String,
    pub dmsetup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigMetadata {
    pub endpoint: String,

    #[serde(alias = "timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigSnapshot {
    pub description: String,

    // Extra tags for every snapshot
    pub tags: TagMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance_id: None,
            region: None,
            profile: None,
            max_attempts: defaults::MAX_ATTEMPTS,
            sys_block: defaults::SYS_BLOCK.to_string(),
            commands: ConfigCommands::default(),
            metadata: ConfigMetadata::default(),
            snapshot: ConfigSnapshot::default(),
        }
    }
}

impl Default for ConfigCommands {
    fn default() -> Self {
        Self {
            aws: defaults::AWS_CMD.to_string(),
            lsblk: defaults::LSBLK_CMD.to_string(),
            fsfreeze: defaults::FSFREEZE_CMD.to_string(),
            dmsetup: defaults::DMSETUP_CMD.to_string(),
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        Self {
            endpoint: defaults::METADATA_ENDPOINT.to_string(),
            timeout_secs: defaults::METADATA_TIMEOUT_SECS,
        }
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            description: defaults::DESCRIPTION.to_string(),
            tags: TagMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(config_yaml: &str) -> Result<Self, SnapError> {
        if config_yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(config_yaml)
            .map_err(|err| SnapError::BadConfig(format!("bad yaml: {err}")))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads config from `config_file`, or from the file named by
    /// `EC2_SNAP_CONFIG` if `config_file` is None.
    /// Defaults are used if neither is given.
    pub fn load(config_file: Option<&str>) -> Result<Self, SnapError> {
        let config_file = match config_file {
            Some(f) => f.to_string(),
            None => match env::var(ENV_SNAP_CONFIG) {
                Ok(f) if !f.is_empty() => f,
                _ => return Ok(Self::default()),
            },
        };

        let config_yaml = std::fs::read_to_string(&config_file)
            .map_err(|err| SnapError::NoSuchFile(err, config_file.clone()))?;

        Self::from_yaml(&config_yaml)
    }

    fn validate(&self) -> Result<(), SnapError> {
        if self.max_attempts == 0 {
            return Err(SnapError::BadConfig("max_attempts must be at least 1".into()));
        }

        let commands = [
            ("aws", &self.commands.aws),
            ("lsblk", &self.commands.lsblk),
            ("fsfreeze", &self.commands.fsfreeze),
            ("dmsetup", &self.commands.dmsetup),
        ];

        for (name, cmd) in commands {
            if cmd.is_empty() {
                return Err(SnapError::BadConfig(format!("empty command for {name}")));
            }
        }

        if self.sys_block.is_empty() {
            return Err(SnapError::BadConfig("empty sys_block".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml() {
        let config_yaml = "
instance-id: i-0abc
region: ap-southeast-1
retries: 3
commands:
  aws: /usr/local/bin/aws
snapshot:
  description: nightly
  tags:
    Name: db
    env: prod
";
        let config = Config::from_yaml(config_yaml).expect("failed to parse config");

        assert_eq!(config.instance_id.as_deref(), Some("i-0abc"));
        assert_eq!(config.region.as_deref(), Some("ap-southeast-1"));
        assert_eq!(config.profile, None);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.commands.aws, "/usr/local/bin/aws");
        assert_eq!(config.commands.lsblk, defaults::LSBLK_CMD);
        assert_eq!(config.sys_block, defaults::SYS_BLOCK);
        assert_eq!(config.metadata, ConfigMetadata::default());
        assert_eq!(config.snapshot.description, "nightly");
        assert_eq!(config.snapshot.tags.get("env"), Some("prod"));
    }

    #[test]
    fn test_config_defaults() {
        for config_yaml in ["", "  \n", "{}"] {
            let config = Config::from_yaml(config_yaml).expect("failed to parse empty config");
            assert_eq!(config, Config::default());
        }
    }

    #[test]
    fn test_config_bad() {
        let should_err = vec![
            "no_such_key: true",
            "max_attempts: 0",
            "max_attempts: many",
            "commands:\n  aws: ''",
            "commands:\n  rsync: rsync",
            "- a\n- b",
        ];

        for config_yaml in should_err {
            match Config::from_yaml(config_yaml) {
                Err(SnapError::BadConfig(_)) => {}
                result => panic!("unexpected result from {config_yaml}: {result:?}"),
            }
        }
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "profile: backup\n").expect("failed to write config");

        let config = Config::load(path.to_str()).expect("failed to load config");
        assert_eq!(config.profile.as_deref(), Some("backup"));

        match Config::load(Some("/no/such/ec2-snap.yaml")) {
            Err(SnapError::NoSuchFile(_, f)) => assert_eq!(f, "/no/such/ec2-snap.yaml"),
            result => panic!("unexpected result {result:?}"),
        }
    }
}
