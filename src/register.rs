//! This module is used to define the registers on the MoPi.
//!
//! Register addresses are fixed by the board firmware and must match exactly.

use core::fmt;

use strum_macros::EnumIter;

use crate::error::InvalidParameter;

/// 7-bit SMBus address of the MoPi.
pub const DEVICE_ADDRESS: u8 = 0x0B;

/// Value the bus returns for a word read when the board did not answer.
///
/// This is a transport convention, not a board value. Word reads treat it as
/// "try again" and only give up once every attempt has returned it.
pub const NO_DATA: u16 = 0xFFFF;

/// Number of times to try a failed read or write before giving up.
pub const MAX_TRIES: u8 = 3;

/// Oldest firmware this driver knows how to talk to.
pub const REQUIRED_FIRMWARE: FirmwareVersion = FirmwareVersion::new(3, 5);

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum MopiRegister {
    /// __R__ - Status word.
    ///
    /// See [`Status`](crate::status::Status) for the bit layout.
    Status = 0,
    /// __R__ - Voltage of input #1 in millivolts.
    Voltage0 = 1,
    /// __R/W__ - Battery profile of input #1 (5 byte block).
    Config0 = 2,
    /// __R/W__ - Power on delay in seconds.
    PowerOnDelay = 3,
    /// __R/W__ - Shutdown delay in seconds.
    ShutdownDelay = 4,
    /// __R__ - Voltage of input #2 in millivolts.
    Voltage1 = 5,
    /// __R__ - Voltage of the combined input in millivolts.
    Voltage2 = 6,
    /// __R/W__ - Battery profile of input #2 (5 byte block).
    Config1 = 7,
    /// __R/W__ - Battery profile of the combined input (5 byte block).
    Config2 = 8,
    /// __R__ - Firmware version. High byte is major, low byte is minor.
    FirmwareVersion = 9,
    /// __R__ - Serial number.
    SerialNumber = 10,
}

impl From<MopiRegister> for u8 {
    fn from(value: MopiRegister) -> Self {
        value as u8
    }
}

/// The three power inputs which have their own voltage reading and battery profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, EnumIter)]
#[repr(u8)]
pub enum Input {
    #[default]
    Input0 = 0,
    Input1 = 1,
    Input2 = 2,
}

impl Input {
    /// Register holding the measured voltage for this input.
    pub fn voltage_register(self) -> MopiRegister {
        match self {
            Input::Input0 => MopiRegister::Voltage0,
            Input::Input1 => MopiRegister::Voltage1,
            Input::Input2 => MopiRegister::Voltage2,
        }
    }

    /// Register holding the battery profile block for this input.
    pub fn config_register(self) -> MopiRegister {
        match self {
            Input::Input0 => MopiRegister::Config0,
            Input::Input1 => MopiRegister::Config1,
            Input::Input2 => MopiRegister::Config2,
        }
    }
}

impl TryFrom<u8> for Input {
    type Error = InvalidParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Input::Input0),
            1 => Ok(Input::Input1),
            2 => Ok(Input::Input2),
            other => Err(InvalidParameter::Input(other)),
        }
    }
}

/// Firmware version as reported by the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether a board running `self` can be driven by code written against `required`.
    ///
    /// Major versions must match exactly, minor versions are backwards compatible.
    pub fn is_compatible_with(&self, required: FirmwareVersion) -> bool {
        self.major == required.major && self.minor >= required.minor
    }
}

impl From<u16> for FirmwareVersion {
    fn from(word: u16) -> Self {
        let [major, minor] = word.to_be_bytes();
        Self { major, minor }
    }
}

impl From<FirmwareVersion> for u16 {
    fn from(value: FirmwareVersion) -> Self {
        u16::from_be_bytes([value.major, value.minor])
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}
