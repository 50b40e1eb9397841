//! Battery profiles, as stored in the per-input configuration blocks.
//!
//! On the wire a profile is 5 bytes:
//! * byte 0 - source type (see [`SourceType`]), or [`UNSET_SOURCE_TYPE`].
//! * bytes 1-4 - max, good, low and critical thresholds in units of 100mV.
//!
//! Thresholds are truncated to whole 100mV steps when written, so e.g. `1250` mV
//! reads back as `1200` mV.

use strum_macros::EnumIter;

use crate::error::InvalidParameter;

/// Length of a configuration block.
pub const CONFIG_BLOCK_LEN: usize = 5;

/// Source type byte of a block that has never been configured. Thresholds of
/// such a block are not scaled when read.
pub const UNSET_SOURCE_TYPE: u8 = 255;

/// Millivolts per stored threshold step.
pub const MV_PER_STEP: u32 = 100;

/// Battery chemistry the board should assume for an input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum SourceType {
    NiMh = 1,
    Alkaline = 2,
    Other = 3,
}

impl TryFrom<u32> for SourceType {
    type Error = InvalidParameter;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SourceType::NiMh),
            2 => Ok(SourceType::Alkaline),
            3 => Ok(SourceType::Other),
            other => Err(InvalidParameter::SourceType(other)),
        }
    }
}

impl TryFrom<u8> for SourceType {
    type Error = InvalidParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SourceType::try_from(u32::from(value))
    }
}

/// Voltage thresholds for one input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BatteryProfile {
    pub source_type: SourceType,
    /// Voltage of a full source in millivolts.
    pub max_mv: u32,
    /// Voltage above which the source is considered good.
    pub good_mv: u32,
    /// Voltage below which the source is considered low.
    pub low_mv: u32,
    /// Voltage at which the board shuts the Pi down.
    pub critical_mv: u32,
}

impl BatteryProfile {
    pub const fn new(
        source_type: SourceType,
        max_mv: u32,
        good_mv: u32,
        low_mv: u32,
        critical_mv: u32,
    ) -> Self {
        Self {
            source_type,
            max_mv,
            good_mv,
            low_mv,
            critical_mv,
        }
    }

    /// Thresholds in block order: max, good, low, critical.
    pub fn thresholds_mv(&self) -> [u32; 4] {
        [self.max_mv, self.good_mv, self.low_mv, self.critical_mv]
    }

    /// Encode into a configuration block.
    ///
    /// Fails if any threshold does not fit in a byte after scaling.
    pub fn to_block(&self) -> Result<[u8; CONFIG_BLOCK_LEN], InvalidParameter> {
        let mut block = [0u8; CONFIG_BLOCK_LEN];
        block[0] = self.source_type as u8;
        for (slot, mv) in block[1..].iter_mut().zip(self.thresholds_mv()) {
            *slot = u8::try_from(mv / MV_PER_STEP).map_err(|_| InvalidParameter::Voltage(mv))?;
        }
        Ok(block)
    }

    /// The profile as the board will report it back, thresholds truncated to 100mV steps.
    pub fn truncated(&self) -> Self {
        let step = |mv: u32| mv / MV_PER_STEP * MV_PER_STEP;
        Self {
            source_type: self.source_type,
            max_mv: step(self.max_mv),
            good_mv: step(self.good_mv),
            low_mv: step(self.low_mv),
            critical_mv: step(self.critical_mv),
        }
    }

    /// Flat form: type, max, good, low, critical.
    pub fn to_values(&self) -> [u32; CONFIG_BLOCK_LEN] {
        let [max, good, low, critical] = self.thresholds_mv();
        [self.source_type as u32, max, good, low, critical]
    }
}

impl TryFrom<[u32; CONFIG_BLOCK_LEN]> for BatteryProfile {
    type Error = InvalidParameter;

    fn try_from(values: [u32; CONFIG_BLOCK_LEN]) -> Result<Self, Self::Error> {
        let [source_type, max_mv, good_mv, low_mv, critical_mv] = values;
        Ok(Self::new(
            SourceType::try_from(source_type)?,
            max_mv,
            good_mv,
            low_mv,
            critical_mv,
        ))
    }
}

/// Decoded contents of a configuration block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigBlock {
    /// A configured profile, thresholds in millivolts.
    Profile(BatteryProfile),
    /// Never configured, bytes as stored.
    Unset([u8; CONFIG_BLOCK_LEN]),
}

impl ConfigBlock {
    /// Returns `None` if the source type byte is neither a known type nor unset.
    pub fn decode(block: [u8; CONFIG_BLOCK_LEN]) -> Option<Self> {
        if block[0] == UNSET_SOURCE_TYPE {
            return Some(ConfigBlock::Unset(block));
        }
        let source_type = SourceType::try_from(block[0]).ok()?;
        let [max_mv, good_mv, low_mv, critical_mv] = [block[1], block[2], block[3], block[4]]
            .map(|step| step as u32 * MV_PER_STEP);
        Some(ConfigBlock::Profile(BatteryProfile::new(
            source_type,
            max_mv,
            good_mv,
            low_mv,
            critical_mv,
        )))
    }

    pub fn profile(&self) -> Option<&BatteryProfile> {
        match self {
            ConfigBlock::Profile(profile) => Some(profile),
            ConfigBlock::Unset(_) => None,
        }
    }
}

/// Flat form of a block: type, then thresholds in millivolts.
///
/// Thresholds of an unset block are passed through unscaled.
pub fn block_values(block: [u8; CONFIG_BLOCK_LEN]) -> [u32; CONFIG_BLOCK_LEN] {
    let mut values = block.map(u32::from);
    if block[0] != UNSET_SOURCE_TYPE {
        for value in &mut values[1..] {
            *value *= MV_PER_STEP;
        }
    }
    values
}
