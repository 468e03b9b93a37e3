use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// Wire command identifiers, one byte each.
///
/// `QueryData` and `SetVolume` open a framed capture; `Start` and `Stop`
/// are complete in the single byte. `NoCommand` means nothing was
/// received this cycle. 255 is a reserved maximum and lands in `Unknown`
/// together with every other unassigned byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Command {
    NoCommand = 0,
    QueryData = 1,
    SetVolume = 2,
    Start = 3,
    Stop = 4,

    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Command {
    /// Framed commands carry a payload beyond the identifying byte.
    pub fn is_framed(&self) -> bool {
        matches!(self, Command::QueryData | Command::SetVolume)
    }
}
