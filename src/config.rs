//! Driver options.
//!
//! The defaults match a stock MoPi, most users will never need to change them.

use crate::register::{DEVICE_ADDRESS, FirmwareVersion, MAX_TRIES, REQUIRED_FIRMWARE};

/// How word reads are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadCheck {
    /// Retry while the bus returns [`NO_DATA`](crate::register::NO_DATA), accept anything else.
    #[default]
    Sentinel,
    /// As [`ReadCheck::Sentinel`], but words with bit 15 or bit 7 set are read
    /// again and only accepted once two consecutive reads agree.
    ///
    /// Some boards glitch those bits under load. This costs up to two extra
    /// reads for such words.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// 7-bit bus address of the board.
    pub address: u8,
    /// Attempts per read or write before giving up. Values below 1 are treated as 1.
    pub max_tries: u8,
    /// Oldest firmware accepted when connecting.
    pub required_firmware: FirmwareVersion,
    pub read_check: ReadCheck,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverOptions {
    pub const fn new() -> Self {
        Self {
            address: DEVICE_ADDRESS,
            max_tries: MAX_TRIES,
            required_firmware: REQUIRED_FIRMWARE,
            read_check: ReadCheck::Sentinel,
        }
    }

    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_max_tries(mut self, max_tries: u8) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub const fn with_required_firmware(mut self, required: FirmwareVersion) -> Self {
        self.required_firmware = required;
        self
    }

    pub const fn with_read_check(mut self, read_check: ReadCheck) -> Self {
        self.read_check = read_check;
        self
    }

    /// Attempts actually made, never zero.
    pub(crate) fn tries(&self) -> u8 {
        self.max_tries.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DriverOptions::default();
        assert_eq!(options.address, 0x0B);
        assert_eq!(options.max_tries, 3);
        assert_eq!(options.required_firmware, FirmwareVersion::new(3, 5));
        assert_eq!(options.read_check, ReadCheck::Sentinel);
    }

    #[test]
    fn builder() {
        let options = DriverOptions::new()
            .with_address(0x0C)
            .with_max_tries(0)
            .with_read_check(ReadCheck::Strict);
        assert_eq!(options.address, 0x0C);
        assert_eq!(options.tries(), 1);
        assert_eq!(options.read_check, ReadCheck::Strict);
    }
}
