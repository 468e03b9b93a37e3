// Protocol constants for the Soundbound control link

/// Protocol major version reported in query responses
pub const VERSION_MAJOR: u8 = 0;

/// Protocol minor version reported in query responses
pub const VERSION_MINOR: u8 = 1;

/// Maximum number of speakers one controller can expose
pub const MAX_SPEAKERS: usize = 8;

/// Size of the device name field, including the trailing NUL (21 bytes)
pub const DEVICE_NAME_SIZE: usize = 21;

/// Capacity of a framed payload buffer (32 bytes)
pub const MAX_PACKET_SIZE: usize = 32;

/// Size of a QUERY_DATA response on the wire:
/// command + major + minor + speaker id slots + device name field
pub const QUERY_RESPONSE_SIZE: usize = 3 + MAX_SPEAKERS + DEVICE_NAME_SIZE;

/// Size of a SET_VOLUME payload after the command byte
pub const VOLUME_PAYLOAD_SIZE: usize = 3;

/// Top of the logical volume scale; hardware ranges map against this
pub const VOLUME_SCALE_MAX: u8 = 100;
