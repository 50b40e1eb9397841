//! Decoding of the MoPi status word.
//!
//! Bits 0-14 each carry one condition, bit 15 is unused. Decoding is pure, a
//! [`Status`] is a snapshot and has to be fetched again to see changes.

use core::fmt;

use modular_bitfield::prelude::*;
use strum_macros::{EnumCount, EnumIter};

use crate::error::InvalidStatus;

/// Raw bit layout of the status register, least significant bit first.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBits {
    pub source_one_active: bool,
    pub source_two_active: bool,
    pub led_blue: bool,
    pub led_green: bool,
    pub led_red: bool,
    pub led_flashing: bool,
    /// Set when the battery profile jumper is fitted.
    pub jumper_fitted: bool,
    pub forced_shutdown: bool,
    pub power_on_delay_set: bool,
    pub power_on_delay_active: bool,
    pub shutdown_delay_set: bool,
    pub shutdown_delay_active: bool,
    pub check_source_one: bool,
    pub check_source_two: bool,
    pub user_configuration: bool,
    #[skip]
    __: B1,
}

/// Every condition reported in the status word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, EnumCount)]
pub enum StatusFlag {
    SourceOneActive,
    SourceTwoActive,
    LedBlue,
    LedGreen,
    LedRed,
    LedFlashing,
    /// True when the jumper is *absent*, which selects the NiMH profile.
    JumperState,
    ForcedShutdown,
    PowerOnDelaySet,
    PowerOnDelayActive,
    ShutdownDelaySet,
    ShutdownDelayActive,
    CheckSourceOne,
    CheckSourceTwo,
    UserConfiguration,
}

impl StatusFlag {
    /// Bit index of this flag in the status word.
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

/// Most lines a [`Summary`] can hold.
pub const SUMMARY_CAPACITY: usize = 16;

/// A decoded status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    word: u16,
    bits: StatusBits,
}

impl Status {
    pub fn new(word: u16) -> Self {
        Self {
            word,
            bits: StatusBits::from_bytes(word.to_le_bytes()),
        }
    }

    /// The raw status word.
    pub fn word(&self) -> u16 {
        self.word
    }

    pub fn bits(&self) -> StatusBits {
        self.bits
    }

    pub fn source_one_active(&self) -> bool {
        self.bits.source_one_active()
    }

    pub fn source_two_active(&self) -> bool {
        self.bits.source_two_active()
    }

    pub fn led_blue(&self) -> bool {
        self.bits.led_blue()
    }

    pub fn led_green(&self) -> bool {
        self.bits.led_green()
    }

    pub fn led_red(&self) -> bool {
        self.bits.led_red()
    }

    pub fn led_flashing(&self) -> bool {
        self.bits.led_flashing()
    }

    /// Inverse of bit 6: true means the jumper is absent.
    pub fn jumper_state(&self) -> bool {
        !self.bits.jumper_fitted()
    }

    pub fn forced_shutdown(&self) -> bool {
        self.bits.forced_shutdown()
    }

    pub fn power_on_delay_set(&self) -> bool {
        self.bits.power_on_delay_set()
    }

    pub fn power_on_delay_active(&self) -> bool {
        self.bits.power_on_delay_active()
    }

    pub fn shutdown_delay_set(&self) -> bool {
        self.bits.shutdown_delay_set()
    }

    pub fn shutdown_delay_active(&self) -> bool {
        self.bits.shutdown_delay_active()
    }

    pub fn check_source_one(&self) -> bool {
        self.bits.check_source_one()
    }

    pub fn check_source_two(&self) -> bool {
        self.bits.check_source_two()
    }

    pub fn user_configuration(&self) -> bool {
        self.bits.user_configuration()
    }

    pub fn flag(&self, flag: StatusFlag) -> bool {
        use StatusFlag as SF;
        match flag {
            SF::JumperState => self.jumper_state(),
            other => (self.word >> other.bit()) & 1 == 1,
        }
    }

    /// All flags which are currently true, in bit order.
    pub fn active_flags(&self) -> impl Iterator<Item = StatusFlag> + '_ {
        use strum::IntoEnumIterator;
        StatusFlag::iter().filter(|flag| self.flag(*flag))
    }

    /// Human readable description of the status, one condition per line.
    ///
    /// Fails if neither source is reported active, which the board never
    /// does while it is powering anything. Words such as `0x3000` with only
    /// the source checks set are rejected too, even though they would still
    /// produce the "Source #n good" lines.
    pub fn summary(&self) -> Result<Summary, InvalidStatus> {
        if !self.source_one_active() && !self.source_two_active() {
            return Err(InvalidStatus(self.word));
        }

        let profile_from_jumper = !self.user_configuration();
        let lines = [
            (self.source_one_active(), "Source #1 active"),
            (self.source_two_active(), "Source #2 active"),
            (self.led_blue(), "Source full (blue led)"),
            (self.led_green(), "Source good (green led)"),
            (self.led_red(), "Source low (red led)"),
            (self.led_flashing(), "Source critical (flashing red led)"),
            (profile_from_jumper && self.jumper_state(), "NiMH battery profile"),
            (profile_from_jumper && !self.jumper_state(), "Alkaline battery profile"),
            (self.forced_shutdown(), "Forced shutdown"),
            (self.power_on_delay_set(), "Power on delay set"),
            (self.power_on_delay_active(), "Power on delay in progress"),
            (self.shutdown_delay_set(), "Shutdown delay set"),
            (self.shutdown_delay_active(), "Shutdown delay in progress"),
            (self.check_source_one(), "Source #1 good"),
            (!self.check_source_one(), "Source #1 low/not present"),
            (self.check_source_two(), "Source #2 good"),
            (!self.check_source_two(), "Source #2 low/not present"),
            (self.user_configuration(), "User configured"),
        ]
        .into_iter()
        .filter_map(|(set, line)| set.then_some(line))
        .collect();

        Ok(Summary { lines })
    }
}

impl From<u16> for Status {
    fn from(word: u16) -> Self {
        Status::new(word)
    }
}

/// Ordered list of conditions produced by [`Status::summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    lines: heapless::Vec<&'static str, SUMMARY_CAPACITY>,
}

impl Summary {
    pub fn lines(&self) -> &[&'static str] {
        &self.lines
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| *l == line)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}
