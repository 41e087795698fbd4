use crate::config::Config;
use crate::errors::SnapError;
use crate::linux::Linux;

/// Prints mount units of this instance as JSON
pub fn run(config: &mut Config) -> Result<(), SnapError> {
    let linux = Linux::new(config);
    let (_instance_id, units) = super::discover(config, &linux)?;

    println!("{}", super::to_json_pretty(&units)?);

    Ok(())
}
