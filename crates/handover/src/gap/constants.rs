// Address types
pub const PUBLIC_DEVICE_ADDRESS: u8 = 0x00;
pub const RANDOM_DEVICE_ADDRESS: u8 = 0x01;

// Class of Device layout
pub const CLASS_OF_DEVICE_SIZE: usize = 3;
pub const DEVICE_CLASS_MASK: u32 = 0x1FFC;
pub const SERVICE_CLASS_MASK: u32 = 0xFFE000;

// Major/minor device classes (audio/video)
pub const AUDIO_VIDEO_WEARABLE_HEADSET: u32 = 0x0404;
pub const AUDIO_VIDEO_HANDSFREE: u32 = 0x0408;
pub const AUDIO_VIDEO_LOUDSPEAKER: u32 = 0x0414;
pub const AUDIO_VIDEO_HEADPHONES: u32 = 0x0418;
pub const AUDIO_VIDEO_CAR_AUDIO: u32 = 0x0420;
pub const AUDIO_VIDEO_HIFI_AUDIO: u32 = 0x0428;

// Service UUIDs (16-bit SIG assigned) relevant to peripheral handover
pub const UUID_HEADSET: u16 = 0x1108;
pub const UUID_AUDIO_SINK: u16 = 0x110B;
pub const UUID_ADVANCED_AUDIO_DISTRIBUTION: u16 = 0x110D;
pub const UUID_HANDSFREE: u16 = 0x111E;
