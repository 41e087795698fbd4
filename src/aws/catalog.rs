use super::VolumeProvider;
use crate::entity::tags::TagMap;
use crate::entity::volume::VolumeRecord;
use crate::errors::SnapError;
use crate::linux::device;

/// Attached cloud volumes, keyed by local device name
pub struct VolumeCatalog<P: VolumeProvider> {
    provider: P,
    sys_block: String,
}

impl<P: VolumeProvider> VolumeCatalog<P> {
    pub fn new(provider: P, sys_block: &str) -> Self {
        Self {
            provider,
            sys_block: sys_block.to_string(),
        }
    }

    /// Lists volumes attached to `instance_id`.
    ///
    /// Volumes with zero or multiple attachments are skipped.
    /// Attachment devices are translated to local names here, once.
    ///
    /// Only [`SnapError::ProviderQuery`] is worth retrying: prefix detection
    /// and translation errors mean the local topology cannot be trusted,
    /// and abort the whole list.
    pub fn list_attached(&self, instance_id: &str) -> Result<Vec<VolumeRecord>, SnapError> {
        let volumes = self.provider.query_attached_volumes(instance_id)?;
        let prefix = device::detect_prefix(&self.sys_block)?;

        let mut records = Vec::new();
        for volume in volumes {
            let attachment = match volume.attachments.as_slice() {
                [attachment] => attachment,
                _ => continue,
            };

            records.push(VolumeRecord {
                device: device::translate_strict(&attachment.device, prefix)?,
                state: attachment.state.clone(),
                instance_id: attachment.instance_id.clone(),
                volume_id: attachment.volume_id.clone(),
                tags: TagMap::from(volume.tags.as_slice()),
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::aws::{
        ProviderAttachment,
        ProviderTag,
        ProviderVolume,
    };

    struct MockProvider {
        volumes: Vec<ProviderVolume>,
        fail: bool,
    }

    impl VolumeProvider for MockProvider {
        fn query_attached_volumes(&self, instance_id: &str) -> Result<Vec<ProviderVolume>, SnapError> {
            if self.fail {
                return Err(SnapError::ProviderQuery(format!("no credentials for {instance_id}")));
            }

            Ok(self.volumes.clone())
        }
    }

    fn attachment(device: &str, volume_id: &str) -> ProviderAttachment {
        ProviderAttachment {
            device: device.into(),
            state: "attached".into(),
            instance_id: "i-0abc".into(),
            volume_id: volume_id.into(),
        }
    }

    fn volume(volume_id: &str, attachments: Vec<ProviderAttachment>, tags: Vec<(&str, &str)>) -> ProviderVolume {
        ProviderVolume {
            volume_id: volume_id.into(),
            attachments,
            tags: tags
                .into_iter()
                .map(|(k, v)| ProviderTag { key: k.into(), value: v.into() })
                .collect(),
        }
    }

    fn sys_block(devices: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for dev in devices {
            fs::File::create(dir.path().join(dev)).expect("failed to create fake device");
        }

        dir
    }

    #[test]
    fn test_list_attached() {
        let dir = sys_block(&["xvda", "xvdf"]);
        let provider = MockProvider {
            volumes: vec![
                volume("vol-root", vec![attachment("/dev/sda1", "vol-root")], vec![]),
                volume("vol-data", vec![attachment("/dev/sdf", "vol-data")], vec![("Name", "data"), ("env", "prod")]),
                // Mid-detach or multi-attach, skipped
                volume("vol-multi", vec![attachment("/dev/sdg", "vol-multi"), attachment("/dev/sdg", "vol-multi")], vec![]),
                volume("vol-none", vec![], vec![]),
            ],
            fail: false,
        };

        let catalog = VolumeCatalog::new(provider, dir.path().to_str().expect("bad temp path"));
        let records = catalog.list_attached("i-0abc").expect("failed to list volumes");

        assert_eq!(records.len(), 2);

        assert_eq!(records[0].device, "xvda");
        assert_eq!(records[0].volume_id, "vol-root");
        assert_eq!(records[0].state, "attached");
        assert_eq!(records[0].instance_id, "i-0abc");
        assert_eq!(records[0].tags, TagMap::with_name());

        assert_eq!(records[1].device, "xvdf");
        assert_eq!(records[1].tags.get("Name"), Some("data"));
        assert_eq!(records[1].tags.get("env"), Some("prod"));
    }

    #[test]
    fn test_list_attached_sd() {
        let dir = sys_block(&["sda", "sdf"]);
        let provider = MockProvider {
            volumes: vec![volume("vol-data", vec![attachment("/dev/xvdf", "vol-data")], vec![])],
            fail: false,
        };

        let catalog = VolumeCatalog::new(provider, dir.path().to_str().expect("bad temp path"));
        let records = catalog.list_attached("i-0abc").expect("failed to list volumes");

        assert_eq!(records[0].device, "sdf");
    }

    #[test]
    fn test_list_attached_errors() {
        let dir = sys_block(&["xvda"]);

        let provider = MockProvider { volumes: vec![], fail: true };
        let catalog = VolumeCatalog::new(provider, dir.path().to_str().expect("bad temp path"));
        match catalog.list_attached("i-0abc") {
            Err(SnapError::ProviderQuery(_)) => {}
            result => panic!("unexpected result {result:?}"),
        }

        // Unknown scheme aborts the whole list
        let provider = MockProvider {
            volumes: vec![
                volume("vol-root", vec![attachment("/dev/sda1", "vol-root")], vec![]),
                volume("vol-odd", vec![attachment("/dev/nvme1n1", "vol-odd")], vec![]),
            ],
            fail: false,
        };
        let catalog = VolumeCatalog::new(provider, dir.path().to_str().expect("bad temp path"));
        match catalog.list_attached("i-0abc") {
            Err(SnapError::DeviceTranslation(_)) => {}
            result => panic!("unexpected result {result:?}"),
        }

        // Unrecognized local naming scheme
        let nvme = sys_block(&["nvme0n1"]);
        let provider = MockProvider {
            volumes: vec![volume("vol-root", vec![attachment("/dev/sda1", "vol-root")], vec![])],
            fail: false,
        };
        let catalog = VolumeCatalog::new(provider, nvme.path().to_str().expect("bad temp path"));
        match catalog.list_attached("i-0abc") {
            Err(SnapError::PrefixNotDetected(_)) => {}
            result => panic!("unexpected result {result:?}"),
        }
    }
}
