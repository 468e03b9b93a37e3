use bytes::{BufMut, Bytes, BytesMut};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::command::Command;
use crate::constants::{DEVICE_NAME_SIZE, MAX_PACKET_SIZE, MAX_SPEAKERS, QUERY_RESPONSE_SIZE};
use crate::error::SbError;

/// Bounded buffer collecting one framed payload, one byte at a time.
///
/// Tagged with the command that opened the frame. The capacity is fixed;
/// the buffer never reallocates and overflow is not an error, only a
/// rejected append the caller treats as a finalize trigger.
#[derive(Debug, Clone)]
pub struct PacketAccumulator {
    cmd: Command,
    buf: [u8; MAX_PACKET_SIZE],
    len: usize,
    done: bool,
}

impl PacketAccumulator {
    pub fn new(cmd: Command) -> Self {
        PacketAccumulator {
            cmd,
            buf: [0; MAX_PACKET_SIZE],
            len: 0,
            done: false,
        }
    }

    /// The command that opened this frame.
    pub fn opening_command(&self) -> Command {
        self.cmd
    }

    /// Appends one byte. Returns false without mutating once the buffer
    /// is at capacity.
    pub fn append(&mut self, byte: u8) -> bool {
        if self.len >= MAX_PACKET_SIZE {
            return false;
        }

        self.buf[self.len] = byte;
        self.len += 1;

        true
    }

    pub fn is_full(&self) -> bool {
        self.len >= MAX_PACKET_SIZE
    }

    /// Finalizes the frame. Idempotent; a done frame never reopens.
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The bytes captured so far.
    pub fn contents(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Wire layout of a SET_VOLUME payload as captured by the accumulator.
///
/// The leading command byte is consumed during classification and is
/// never stored in the frame, so the payload starts at the speaker id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct VolumeSetRequest {
    pub speaker_id: u8,
    pub volume: u8,
    pub reserved: u8,
}

impl VolumeSetRequest {
    /// Parses a request from the leading bytes of a captured payload.
    pub fn parse(payload: &[u8]) -> Result<Self, SbError> {
        let (request, _rest) =
            VolumeSetRequest::read_from_prefix(payload).map_err(|_| SbError::TruncatedPayload {
                expected: size_of::<VolumeSetRequest>(),
                actual: payload.len(),
            })?;

        Ok(request)
    }
}

/// Companion-side encoding of a SET_VOLUME request.
pub fn encode_set_volume(speaker_id: u8, volume: u8) -> [u8; 4] {
    [Command::SetVolume.into(), speaker_id, volume, 0]
}

/// Response to a QUERY_DATA command: protocol version, the configured
/// speaker ids and the controller's device name.
///
/// Built fresh on each query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub major: u8,
    pub minor: u8,
    pub speaker_ids: Vec<u8>,
    pub device_name: String,
}

impl QueryResponse {
    /// Serializes to the fixed 32-byte wire layout. Unused speaker id
    /// slots and the tail of the name field are zero-padded; the name
    /// always keeps a trailing NUL.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(QUERY_RESPONSE_SIZE);

        out.put_u8(Command::QueryData.into());
        out.put_u8(self.major);
        out.put_u8(self.minor);

        let mut ids = [0u8; MAX_SPEAKERS];
        for (slot, id) in ids.iter_mut().zip(&self.speaker_ids) {
            *slot = *id;
        }
        out.put_slice(&ids);

        // truncate on a char boundary so the field never carries a torn
        // codepoint, and always keep the trailing NUL
        let mut name = [0u8; DEVICE_NAME_SIZE];
        let mut end = 0;
        for (idx, ch) in self.device_name.char_indices() {
            if idx + ch.len_utf8() > DEVICE_NAME_SIZE - 1 {
                break;
            }
            end = idx + ch.len_utf8();
        }
        name[..end].copy_from_slice(&self.device_name.as_bytes()[..end]);
        out.put_slice(&name);

        out.freeze()
    }

    /// Parses a response received from a controller.
    pub fn parse(buf: &[u8]) -> Result<Self, SbError> {
        if buf.len() != QUERY_RESPONSE_SIZE {
            return Err(SbError::InvalidPacket(format!(
                "query response must be {QUERY_RESPONSE_SIZE} bytes, got {}",
                buf.len()
            )));
        }

        if Command::from(buf[0]) != Command::QueryData {
            return Err(SbError::InvalidPacket(format!(
                "unexpected leading command byte 0x{:02x}",
                buf[0]
            )));
        }

        let speaker_ids = buf[3..3 + MAX_SPEAKERS]
            .iter()
            .copied()
            .take_while(|id| *id != 0)
            .collect();

        let name_field = &buf[3 + MAX_SPEAKERS..];
        let name_len = name_field.iter().position(|b| *b == 0).unwrap_or(name_field.len());
        let device_name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

        Ok(QueryResponse {
            major: buf[1],
            minor: buf[2],
            speaker_ids,
            device_name,
        })
    }
}
