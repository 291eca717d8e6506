//! Profile hints from a tap
//!
//! The OOB record may list service UUIDs and a class of device. Either is enough to
//! tell whether the peer speaks a profile; both are optional.

use crate::gap::{
    DeviceClass, UUID_ADVANCED_AUDIO_DISTRIBUTION, UUID_AUDIO_SINK, UUID_HANDSFREE, UUID_HEADSET,
};
use crate::uuid::Uuid;

pub fn has_headset_capability(uuids: &[Uuid], class: Option<&DeviceClass>) -> bool {
    uuids
        .iter()
        .any(|u| *u == UUID_HANDSFREE || *u == UUID_HEADSET)
        || class.is_some_and(DeviceClass::supports_headset)
}

pub fn has_a2dp_capability(uuids: &[Uuid], class: Option<&DeviceClass>) -> bool {
    uuids
        .iter()
        .any(|u| *u == UUID_AUDIO_SINK || *u == UUID_ADVANCED_AUDIO_DISTRIBUTION)
        || class.is_some_and(DeviceClass::supports_audio_sink)
}
