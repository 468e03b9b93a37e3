use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::constants::VOLUME_SCALE_MAX;

/// Channel-select opcodes for the dual-channel digital potentiometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PotChannel {
    Pot0 = 0x11,
    Pot1 = 0x12,
    Both = 0x13,
}

/// Hardware description of one potentiometer channel: which chip-select
/// line addresses the part, which internal channel to drive, and the
/// usable register range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Potentiometer {
    pub chip_select: u8,
    pub hw_vol_min: u8,
    pub hw_vol_max: u8,
    pub channel: PotChannel,
}

impl Potentiometer {
    /// Maps a logical volume onto this channel's register range.
    ///
    /// The scale is inverted: the register holds attenuation, so logical
    /// 100 maps to the range minimum and logical 0 to the range maximum.
    /// Integer division truncates toward zero. No clamping: inputs above
    /// 100 produce a negative result, exactly as fed in from the wire.
    pub fn to_hw_volume(&self, volume: u8) -> i32 {
        let span = i32::from(self.hw_vol_max) - i32::from(self.hw_vol_min);

        (i32::from(VOLUME_SCALE_MAX) - i32::from(volume)) * span / i32::from(VOLUME_SCALE_MAX)
    }
}

/// One controlled speaker: wire identifier, current logical volume and
/// the potentiometer channel that realizes it.
///
/// Created once at startup and mutated only through the registry's
/// volume-set path.
#[derive(Debug, Clone)]
pub struct Speaker {
    id: u8,
    volume: u8,
    pot: Potentiometer,
}

impl Speaker {
    pub fn new(id: u8, volume: u8, pot: Potentiometer) -> Self {
        Speaker { id, volume, pot }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Current logical volume, 0-100 scale.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn potentiometer(&self) -> &Potentiometer {
        &self.pot
    }

    pub(crate) fn set_volume(&mut self, volume: u8) {
        self.volume = volume;
    }
}
