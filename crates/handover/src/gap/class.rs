//! Class of Device
//!
//! The 24-bit Class of Device field as carried in the OOB EIR data (three bytes,
//! little-endian). Only the parts needed to infer which audio profiles a peer
//! supports are interpreted.

use crate::gap::constants::*;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Major service class bits (bits 13..=23 of the Class of Device)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ServiceClass: u32 {
        const LIMITED_DISCOVERABILITY = 0x002000;
        const POSITIONING = 0x010000;
        const NETWORKING = 0x020000;
        const RENDER = 0x040000;
        const CAPTURE = 0x080000;
        const OBJECT_TRANSFER = 0x100000;
        const AUDIO = 0x200000;
        const TELEPHONY = 0x400000;
        const INFORMATION = 0x800000;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceClass(u32);

impl DeviceClass {
    pub fn new(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    /// Parses the 3-byte little-endian wire form
    pub fn from_bytes(bytes: [u8; CLASS_OF_DEVICE_SIZE]) -> Self {
        Self::new(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }

    pub fn to_bytes(&self) -> [u8; CLASS_OF_DEVICE_SIZE] {
        let b = self.0.to_le_bytes();
        [b[0], b[1], b[2]]
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn services(&self) -> ServiceClass {
        ServiceClass::from_bits_truncate(self.0 & SERVICE_CLASS_MASK)
    }

    /// Major and minor device class combined
    pub fn device(&self) -> u32 {
        self.0 & DEVICE_CLASS_MASK
    }

    /// Whether the class advertises a hands-free or headset role
    pub fn supports_headset(&self) -> bool {
        if self.services().contains(ServiceClass::AUDIO) {
            return true;
        }
        matches!(
            self.device(),
            AUDIO_VIDEO_HANDSFREE | AUDIO_VIDEO_WEARABLE_HEADSET | AUDIO_VIDEO_CAR_AUDIO
        )
    }

    /// Whether the class advertises an audio sink
    pub fn supports_audio_sink(&self) -> bool {
        if self.services().contains(ServiceClass::RENDER) {
            return true;
        }
        matches!(
            self.device(),
            AUDIO_VIDEO_HIFI_AUDIO
                | AUDIO_VIDEO_HEADPHONES
                | AUDIO_VIDEO_LOUDSPEAKER
                | AUDIO_VIDEO_CAR_AUDIO
        )
    }
}

impl fmt::Debug for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceClass(0x{:06X})", self.0)
    }
}
