use crate::aws::catalog::VolumeCatalog;
use crate::aws::ec2::AwsCli;
use crate::config::Config;
use crate::errors::SnapError;

/// Prints volumes attached to this instance as JSON,
/// with device names already in OS-local naming
pub fn run(config: &mut Config) -> Result<(), SnapError> {
    let instance_id = super::resolve_instance(config)?;

    let catalog = VolumeCatalog::new(AwsCli::new(config), &config.sys_block);
    let volumes = catalog.list_attached(&instance_id)?;

    println!("{}", super::to_json_pretty(&volumes)?);

    Ok(())
}
