pub mod defaults {
    pub const AWS_CMD: &str = "aws";
    pub const LSBLK_CMD: &str = "lsblk";
    pub const FSFREEZE_CMD: &str = "fsfreeze";
    pub const DMSETUP_CMD: &str = "dmsetup";

    pub const SYS_BLOCK: &str = "/sys/block";
    pub const METADATA_ENDPOINT: &str = "http://169.254.169.254/latest";
    pub const METADATA_TIMEOUT_SECS: u64 = 1;

    pub const MAX_ATTEMPTS: u32 = 11;
    pub const DESCRIPTION: &str = "ec2-snap-rs crash-consistent snapshot";
}

pub const ENV_SNAP_CONFIG: &str = "EC2_SNAP_CONFIG";
pub const ENV_AWS_MAX_ATTEMPTS: &str = "AWS_MAX_ATTEMPTS";

/// Kernel device name prefixes, in detection order
pub const DEVICE_PREFIXES: [&str; 2] = ["sd", "xvd"];

// Root volume is reported as sda1 by EC2,
// but shows up as disk xvda on Xen guests.
pub const LEGACY_ROOT_ALIAS: &str = "sda1";
pub const LEGACY_BOOT_ALIAS: &str = "xvda";

/// lsblk/blkid FSTYPE of LVM physical volumes
pub const FSTYPE_LVM_MEMBER: &str = "LVM2_member";

pub const TAG_NAME: &str = "Name";

pub const METADATA_INSTANCE_ID: &str = "meta-data/instance-id";
pub const METADATA_AVAILABILITY_ZONE: &str = "meta-data/placement/availability-zone";
pub const METADATA_TOKEN: &str = "api/token";
pub const METADATA_TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
pub const METADATA_TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
pub const METADATA_TOKEN_TTL_SECS: &str = "21600";
