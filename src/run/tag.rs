use colored::Colorize;

use crate::aws::ec2::AwsCli;
use crate::aws::metadata::MetadataClient;
use crate::aws::{
    SnapshotRequester,
    TagInfo,
};
use crate::cli::ArgsTag;
use crate::config::Config;
use crate::entity::tags::TagMap;
use crate::errors::SnapError;

pub fn run(config: &mut Config, args: ArgsTag, dry_run: bool) -> Result<(), SnapError> {
    let info = tag_info(args, dry_run)?;

    // Tagging needs a region, not an instance
    let metadata = MetadataClient::new(config);
    if config.region.is_none() && metadata.available() {
        super::resolve_region(config, &metadata);
    }

    AwsCli::new(config).create_tags(&info)?;

    eprintln!("{}", format!("tagged {}:\n{}", info.resource, info.tags).green());

    Ok(())
}

fn tag_info(args: ArgsTag, dry_run: bool) -> Result<TagInfo, SnapError> {
    let mut tags = TagMap::new();
    for tag in &args.tags {
        tags.insert_pair(tag)?;
    }

    Ok(TagInfo {
        resource: args.resource,
        tags,
        dry_run,
    })
}
