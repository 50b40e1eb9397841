//! Raspberry Pi board revision lookup.
//!
//! The first Pi boards wired the header I2C pins to bus 0, every later board
//! uses bus 1. Callers pick the bus themselves, this is only the lookup.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardRevision {
    /// Model B revision 1.0 (revision codes `0002` and `0003`).
    Rev1,
    /// Everything since.
    Rev2,
}

impl BoardRevision {
    /// Classify a board by the revision code reported in `/proc/cpuinfo`.
    ///
    /// Overvolted boards report the code with a leading `1000`, which is ignored.
    pub fn from_revision_code(code: u32) -> Self {
        match code & 0x00FF_FFFF {
            0x0002 | 0x0003 => BoardRevision::Rev1,
            _ => BoardRevision::Rev2,
        }
    }

    /// Find the `Revision` line of `/proc/cpuinfo` contents and classify it.
    pub fn from_cpuinfo(cpuinfo: &str) -> Option<Self> {
        cpuinfo
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim() == "Revision")
            .and_then(|(_, value)| u32::from_str_radix(value.trim(), 16).ok())
            .map(Self::from_revision_code)
    }

    /// I2C bus number the header pins are wired to.
    pub fn i2c_bus(self) -> u8 {
        match self {
            BoardRevision::Rev1 => 0,
            BoardRevision::Rev2 => 1,
        }
    }

    /// Linux `i2c-dev` node for [`Self::i2c_bus`].
    pub fn i2c_device_path(self) -> &'static str {
        match self {
            BoardRevision::Rev1 => "/dev/i2c-0",
            BoardRevision::Rev2 => "/dev/i2c-1",
        }
    }
}
