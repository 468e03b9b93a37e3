use std::collections::VecDeque;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::bus::RegisterBus;
use crate::command::Command;
use crate::constants::{VERSION_MAJOR, VERSION_MINOR};
use crate::error::SbError;
use crate::packet::{PacketAccumulator, QueryResponse, VolumeSetRequest};
use crate::registry::SpeakerRegistry;

/// Non-blocking byte source feeding the engine.
///
/// `None` is the sentinel for "no data available right now" as well as
/// for end-of-stream; a read must never suspend the caller. The engine
/// treats the sentinel as the finalize trigger for an in-flight frame.
pub trait ByteRead {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Loopback source for bench runs and tests.
impl ByteRead for VecDeque<u8> {
    fn read_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// Capture state: at most one frame is in flight at any time, and it
/// lives inside the state itself.
enum CaptureState {
    Idle,
    Capturing(PacketAccumulator),
}

/// The protocol engine.
///
/// Consumes a command byte stream one byte per call, classifying each
/// byte as an immediate command or as the opening of a framed capture,
/// and drives the speaker registry when a volume frame completes. The
/// caller supplies one tick of progress at a time, so the engine never
/// blocks waiting for a full frame.
pub struct Soundbound<B> {
    registry: SpeakerRegistry<B>,
    state: CaptureState,
}

impl<B: RegisterBus> Soundbound<B> {
    pub fn new(registry: SpeakerRegistry<B>) -> Self {
        Soundbound {
            registry,
            state: CaptureState::Idle,
        }
    }

    pub fn registry(&self) -> &SpeakerRegistry<B> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SpeakerRegistry<B> {
        &mut self.registry
    }

    /// True while a framed capture is open, complete or not.
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing(_))
    }

    /// The frame currently in flight, if any.
    pub fn current_frame(&self) -> Option<&PacketAccumulator> {
        match &self.state {
            CaptureState::Idle => None,
            CaptureState::Capturing(packet) => Some(packet),
        }
    }

    /// Reads and classifies the next command byte.
    ///
    /// Returns `NoCommand` without side effects when the stream has no
    /// data. A framed command opens a capture when none is in flight;
    /// once framing has begun, every call reports the opening command
    /// instead of new input until the frame is consumed.
    pub fn receive_command<R: ByteRead>(&mut self, stream: &mut R) -> Command {
        let Some(byte) = stream.read_byte() else {
            return Command::NoCommand;
        };

        let cmd = Command::from(byte);

        if cmd.is_framed() && !self.is_capturing() {
            debug!(%cmd, "opening framed capture");
            self.state = CaptureState::Capturing(PacketAccumulator::new(cmd));
        }

        if let CaptureState::Capturing(packet) = &self.state {
            return packet.opening_command();
        }

        cmd
    }

    /// Advances the in-flight capture by one byte of stream progress.
    ///
    /// An open frame absorbs the byte; end-of-data or a full buffer
    /// finalizes it. A finalized frame is consumed on the next call:
    /// volume frames dispatch through the registry, everything else is
    /// discarded. No-op while idle.
    pub fn advance<R: ByteRead>(&mut self, stream: &mut R) -> Result<(), SbError> {
        match &mut self.state {
            CaptureState::Idle => Ok(()),
            CaptureState::Capturing(packet) if !packet.is_done() => {
                match stream.read_byte() {
                    None => packet.mark_done(),
                    Some(byte) => {
                        if !packet.append(byte) || packet.is_full() {
                            packet.mark_done();
                        }
                    }
                }

                Ok(())
            }
            CaptureState::Capturing(_) => {
                // a byte arriving while the finished frame drains is dropped
                let _ = stream.read_byte();

                self.consume_frame()
            }
        }
    }

    /// Consumes the completed frame and returns the engine to idle
    /// before dispatching, so a rejected request never leaves a stale
    /// frame behind.
    fn consume_frame(&mut self) -> Result<(), SbError> {
        let CaptureState::Capturing(packet) =
            std::mem::replace(&mut self.state, CaptureState::Idle)
        else {
            return Ok(());
        };

        if packet.opening_command() != Command::SetVolume {
            debug!(cmd = %packet.opening_command(), "discarding completed frame");
            return Ok(());
        }

        match VolumeSetRequest::parse(packet.contents()) {
            Ok(request) => {
                let hw_volume = self.registry.set_volume(request.speaker_id, request.volume)?;

                info!(
                    speaker = %(request.speaker_id as char),
                    volume = request.volume,
                    hw_volume,
                    "speaker volume set"
                );

                Ok(())
            }
            Err(err) => {
                warn!(%err, "discarding malformed volume frame");

                Ok(())
            }
        }
    }

    /// Assembles and writes the fixed-layout query response: protocol
    /// version, speaker ids in configuration order, device name.
    pub fn send_query_response<W: Write>(&self, stream: &mut W) -> Result<(), SbError> {
        let response = QueryResponse {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            speaker_ids: self.registry.speaker_ids().collect(),
            device_name: self.registry.device_name().to_string(),
        };

        stream.write_all(&response.to_bytes())?;

        Ok(())
    }
}
