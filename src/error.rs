//! Our error types for the MoPi board.

use thiserror::Error;

use crate::register::FirmwareVersion;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for MoPi communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Bus transport error")]
    Transport(I),
    #[error("Expected at least MoPi firmware version {required}, got {found} instead")]
    IncompatibleFirmware {
        found: FirmwareVersion,
        required: FirmwareVersion,
    },
    #[error("Invalid parameter, {0}")]
    InvalidParameter(#[from] InvalidParameter),
    /// A write was accepted by the bus but never read back correctly.
    #[error("Communication error on send")]
    CommunicationError,
    /// The bus kept answering with [`NO_DATA`](crate::register::NO_DATA).
    #[error("Communication error on read word")]
    CommunicationIoError,
    /// Only raised when [`ReadCheck::Strict`](crate::config::ReadCheck::Strict) is in use.
    #[error("Communication error on read word, bit 15 or 7")]
    InconsistentRead,
    #[error("Invalid status")]
    InvalidStatus(#[from] InvalidStatus),
    /// A block read came back shorter than expected.
    #[error("Invalid response received")]
    InvalidResponse,
    /// The board holds a configuration with a source type we don't know.
    #[error("Unknown source type {0} in stored configuration")]
    UnknownSourceType(u8),
}

impl<I: embedded_io::Error> Error<I> {
    /// Whether polling again later could reasonably succeed.
    ///
    /// Bad parameters and unsupported firmware will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_)
            | Error::CommunicationError
            | Error::CommunicationIoError
            | Error::InconsistentRead
            | Error::InvalidResponse => true,
            Error::IncompatibleFirmware { .. }
            | Error::InvalidParameter(_)
            | Error::InvalidStatus(_)
            | Error::UnknownSourceType(_) => false,
        }
    }
}

/// Which caller supplied value was out of range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidParameter {
    #[error("type outside range: {0}")]
    SourceType(u32),
    #[error("voltage outside range: {0}mV")]
    Voltage(u32),
    #[error("value outside range: {0:#x}")]
    WordValue(u32),
    #[error("no such input: {0}")]
    Input(u8),
}

/// The status word reported no active power source.
///
/// Real hardware always runs from at least one source, so this points at a
/// wiring or bus fault rather than a board state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no active source in status word {0:#06x}")]
pub struct InvalidStatus(pub u16);
