use tracing::debug;

use crate::bus::RegisterBus;
use crate::config::DeviceConfig;
use crate::constants::{DEVICE_NAME_SIZE, MAX_SPEAKERS};
use crate::error::SbError;
use crate::speaker::{Potentiometer, Speaker};

/// Owner of every configured speaker and of the register bus that
/// realizes their volumes.
///
/// Speakers live for the registry's lifetime and are mutated only
/// through [`SpeakerRegistry::set_volume`]; configuration order is
/// preserved for query responses.
pub struct SpeakerRegistry<B> {
    device_name: String,
    speakers: Vec<Speaker>,
    bus: B,
}

impl<B: RegisterBus> SpeakerRegistry<B> {
    /// Builds the registry from the startup table.
    ///
    /// Rejects tables with more than eight speakers, non-ASCII or
    /// duplicate ids, or a device name that does not fit the wire field.
    pub fn new(config: &DeviceConfig, bus: B) -> Result<Self, SbError> {
        if config.speakers.len() > MAX_SPEAKERS {
            return Err(SbError::TooManySpeakers(config.speakers.len()));
        }

        if config.device_name.len() > DEVICE_NAME_SIZE - 1 {
            return Err(SbError::DeviceNameTooLong(config.device_name.clone()));
        }

        let mut speakers: Vec<Speaker> = Vec::with_capacity(config.speakers.len());

        for entry in &config.speakers {
            if !entry.id.is_ascii() {
                return Err(SbError::NonAsciiSpeakerId(entry.id));
            }

            let id = entry.id as u8;

            if speakers.iter().any(|spk| spk.id() == id) {
                return Err(SbError::DuplicateSpeakerId(entry.id));
            }

            let pot = Potentiometer {
                chip_select: entry.pot.chip_select,
                hw_vol_min: entry.pot.hw_vol_min,
                hw_vol_max: entry.pot.hw_vol_max,
                channel: entry.pot.channel,
            };

            speakers.push(Speaker::new(id, entry.volume, pot));
        }

        Ok(SpeakerRegistry {
            device_name: config.device_name.clone(),
            speakers,
            bus,
        })
    }

    /// Pushes every speaker's configured volume to the hardware once,
    /// at startup.
    pub fn init_volumes(&mut self) {
        for index in 0..self.speakers.len() {
            let volume = self.speakers[index].volume();

            self.write_speaker_volume(index, volume);
        }
    }

    pub fn get(&self, id: u8) -> Result<&Speaker, SbError> {
        self.speakers
            .iter()
            .find(|spk| spk.id() == id)
            .ok_or(SbError::SpeakerNotFound(id))
    }

    /// Sets a speaker's logical volume: computes the register value for
    /// its potentiometer channel, issues the bus write, then records the
    /// new logical volume. Returns the register value written.
    pub fn set_volume(&mut self, id: u8, volume: u8) -> Result<i32, SbError> {
        let index = self
            .speakers
            .iter()
            .position(|spk| spk.id() == id)
            .ok_or(SbError::SpeakerNotFound(id))?;

        Ok(self.write_speaker_volume(index, volume))
    }

    /// Maps and writes one speaker's volume by table position; the
    /// index comes from the table itself, so there is no lookup to fail.
    fn write_speaker_volume(&mut self, index: usize, volume: u8) -> i32 {
        let id = self.speakers[index].id();
        let pot = *self.speakers[index].potentiometer();
        let hw_volume = pot.to_hw_volume(volume);

        self.bus
            .write_register(pot.chip_select, pot.channel, hw_volume as u8);

        self.speakers[index].set_volume(volume);

        debug!(id = %(id as char), volume, hw_volume, "speaker volume updated");

        hw_volume
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Speaker ids in configuration order.
    pub fn speaker_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.speakers.iter().map(Speaker::id)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}
