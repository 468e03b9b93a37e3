use crate::speaker::PotChannel;

/// Hardware-write collaborator for the potentiometer register bus.
///
/// One call is one complete transfer: assert the chip-select line, clock
/// out the channel-select byte then the register value, release the line
/// and let the part settle. Transfers are synchronous and brief; the
/// trait has no error path.
pub trait RegisterBus {
    fn write_register(&mut self, chip_select: u8, channel: PotChannel, value: u8);
}

/// Bus backend that only traces the transfers it is asked to perform.
///
/// Stands in for the real SPI wiring during bench runs of the serve loop.
#[derive(Debug, Default)]
pub struct TraceBus;

impl RegisterBus for TraceBus {
    fn write_register(&mut self, chip_select: u8, channel: PotChannel, value: u8) {
        tracing::info!(chip_select, %channel, opcode = u8::from(channel), value, "register write");
    }
}
