use serde::{Deserialize, Serialize};

use crate::speaker::PotChannel;

/// Potentiometer wiring for one speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotConfig {
    pub chip_select: u8,
    pub hw_vol_min: u8,
    pub hw_vol_max: u8,
    pub channel: PotChannel,
}

/// One speaker entry in the startup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    /// Single ASCII character identifying the speaker on the wire.
    pub id: char,
    /// Initial logical volume, 0-100.
    pub volume: u8,
    pub pot: PotConfig,
}

/// Static startup configuration for one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub device_name: String,
    pub speakers: Vec<SpeakerConfig>,
}

impl DeviceConfig {
    /// Built-in stereo table: one dual-channel potentiometer, left on
    /// channel 0 and right on channel 1, full register range.
    pub fn stereo_demo() -> Self {
        DeviceConfig {
            device_name: "Soundbound".to_string(),
            speakers: vec![
                SpeakerConfig {
                    id: 'L',
                    volume: 50,
                    pot: PotConfig {
                        chip_select: 5,
                        hw_vol_min: 0,
                        hw_vol_max: 255,
                        channel: PotChannel::Pot0,
                    },
                },
                SpeakerConfig {
                    id: 'R',
                    volume: 50,
                    pot: PotConfig {
                        chip_select: 5,
                        hw_vol_min: 0,
                        hw_vol_max: 255,
                        channel: PotChannel::Pot1,
                    },
                },
            ],
        }
    }
}
