//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use std::collections::VecDeque;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

#[allow(unused_imports)]
pub use soundbound_lib::Soundbound;
#[allow(unused_imports)]
pub use soundbound_lib::bus::RegisterBus;
#[allow(unused_imports)]
pub use soundbound_lib::command::Command;
#[allow(unused_imports)]
pub use soundbound_lib::config::{DeviceConfig, PotConfig, SpeakerConfig};
#[allow(unused_imports)]
pub use soundbound_lib::constants::{
    MAX_PACKET_SIZE, MAX_SPEAKERS, QUERY_RESPONSE_SIZE, VERSION_MAJOR, VERSION_MINOR,
};
#[allow(unused_imports)]
pub use soundbound_lib::error::SbError;
#[allow(unused_imports)]
pub use soundbound_lib::packet::{PacketAccumulator, QueryResponse, VolumeSetRequest, encode_set_volume};
#[allow(unused_imports)]
pub use soundbound_lib::registry::SpeakerRegistry;
#[allow(unused_imports)]
pub use soundbound_lib::speaker::{PotChannel, Potentiometer};

static TRACING: Once = Once::new();

/// Routes engine tracing through the test harness, once per process.
/// Set RUST_LOG to see the engine's frame and register-write logs while
/// debugging a failing test.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Register bus that records every transfer for later assertions.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, PotChannel, u8)>,
}

impl RegisterBus for RecordingBus {
    fn write_register(&mut self, chip_select: u8, channel: PotChannel, value: u8) {
        self.writes.push((chip_select, channel, value));
    }
}

/// Two-speaker table: 'A' on channel 0 and 'B' on channel 1 of one
/// full-range potentiometer, both starting at volume 50.
#[allow(dead_code)]
pub fn test_config() -> DeviceConfig {
    init_tracing();

    DeviceConfig {
        device_name: "TestBound".to_string(),
        speakers: vec![
            SpeakerConfig {
                id: 'A',
                volume: 50,
                pot: PotConfig {
                    chip_select: 5,
                    hw_vol_min: 0,
                    hw_vol_max: 255,
                    channel: PotChannel::Pot0,
                },
            },
            SpeakerConfig {
                id: 'B',
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

#[allow(dead_code)]
pub fn test_engine() -> Soundbound<RecordingBus> {
    let registry = SpeakerRegistry::new(&test_config(), RecordingBus::default())
        .expect("test config must build");

    Soundbound::new(registry)
}

/// Byte stream preloaded with the given input; reads past the end yield
/// the end-of-data sentinel.
#[allow(dead_code)]
pub fn stream(bytes: &[u8]) -> VecDeque<u8> {
    bytes.iter().copied().collect()
}
