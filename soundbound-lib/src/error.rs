use std::io;
use thiserror::Error;

/// The primary error type for the `soundbound-lib` library.
#[derive(Error, Debug)]
pub enum SbError {
    #[error("no speaker configured with id 0x{0:02x}")]
    SpeakerNotFound(u8),

    #[error("truncated payload: expected at least {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("too many speakers configured: {0} (limit is 8)")]
    TooManySpeakers(usize),

    #[error("duplicate speaker id {0:?}")]
    DuplicateSpeakerId(char),

    #[error("speaker id {0:?} is not an ASCII character")]
    NonAsciiSpeakerId(char),

    #[error("device name {0:?} does not fit the 21-byte name field")]
    DeviceNameTooLong(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
