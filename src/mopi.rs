use fugit::Duration;
use log::{debug, info, warn};

use crate::{
    config::{DriverOptions, ReadCheck},
    error::{Error, InvalidParameter, Result},
    profile::{BatteryProfile, CONFIG_BLOCK_LEN, ConfigBlock, block_values},
    register::{FirmwareVersion, Input, MopiRegister},
    retry,
    status::{Status, Summary},
    transport::SmbusTransport,
};

/// Bits which some boards glitch under load, see [`ReadCheck::Strict`].
const SUSPECT_BITS: u16 = 0x8080;

/// You can create a Mopi using any bus which implements [`SmbusTransport`].
///
/// For its methods, "get" reads back a configuration value or measurement and
/// "set"/"write" changes a configuration value. Every write is read back and
/// retried until the board reports the new value.
pub struct Mopi<T: SmbusTransport> {
    transport: T,
    options: DriverOptions,
    firmware: FirmwareVersion,
}

impl<T: SmbusTransport> Mopi<T> {
    /// Connect to a board at the default address.
    ///
    /// Fails with [`Error::IncompatibleFirmware`] if the board runs firmware
    /// this driver does not support.
    pub fn new(transport: T) -> Result<Self, T::Error> {
        Self::with_options(transport, DriverOptions::default())
    }

    pub fn with_options(transport: T, options: DriverOptions) -> Result<Self, T::Error> {
        let mut mopi = Self {
            transport,
            options,
            firmware: FirmwareVersion::new(0, 0),
        };

        let found = mopi.get_firmware_version()?;
        let required = options.required_firmware;
        if !found.is_compatible_with(required) {
            warn!("MoPi firmware {} is not compatible with {}", found, required);
            return Err(Error::IncompatibleFirmware { found, required });
        }
        info!("MoPi firmware {} at {:#04x}", found, options.address);

        mopi.firmware = found;
        Ok(mopi)
    }

    /// Consume the driver and return the owned transport.
    pub fn release(self) -> T {
        self.transport
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Firmware version read when connecting.
    pub fn firmware(&self) -> FirmwareVersion {
        self.firmware
    }

    /// Return the raw status word.
    pub fn get_status_raw(&mut self) -> Result<u16, T::Error> {
        self.read_word(MopiRegister::Status)
    }

    /// Return the decoded status.
    pub fn get_status(&mut self) -> Result<Status, T::Error> {
        Ok(Status::new(self.get_status_raw()?))
    }

    /// Return a human readable description of the current status.
    pub fn get_status_summary(&mut self) -> Result<Summary, T::Error> {
        Ok(self.get_status()?.summary()?)
    }

    /// Return the measured voltage of an input in millivolts.
    pub fn get_voltage_mv(&mut self, input: Input) -> Result<u32, T::Error> {
        let millivolts = self.read_word(input.voltage_register())?;
        Ok(millivolts as u32)
    }

    /// Return the battery profile of an input as five values: source type,
    /// then max, good, low and critical thresholds in millivolts.
    ///
    /// Thresholds of a block whose source type is
    /// [`UNSET_SOURCE_TYPE`](crate::profile::UNSET_SOURCE_TYPE) are returned unscaled.
    pub fn read_config_raw(&mut self, input: Input) -> Result<[u32; CONFIG_BLOCK_LEN], T::Error> {
        Ok(block_values(self.read_config_block(input)?))
    }

    /// Return the battery profile of an input.
    ///
    /// Fails with [`Error::UnknownSourceType`] if the board holds a source
    /// type this driver does not know.
    pub fn read_config(&mut self, input: Input) -> Result<ConfigBlock, T::Error> {
        let block = self.read_config_block(input)?;
        ConfigBlock::decode(block).ok_or(Error::UnknownSourceType(block[0]))
    }

    /// Write the battery profile of an input.
    ///
    /// Thresholds are stored in whole 100mV steps, anything below that is
    /// dropped. Nothing is written if the board already holds the profile.
    pub fn write_config(&mut self, profile: &BatteryProfile, input: Input) -> Result<(), T::Error> {
        let block = profile.to_block()?;
        let expected = profile.truncated().to_values();
        let register = input.config_register();
        let address = self.options.address;
        let tries = self.options.tries();

        retry::write_verified(
            self,
            register,
            tries,
            &expected,
            |mopi| {
                mopi.transport
                    .write_block(address, register.into(), &block)
                    .map_err(Error::Transport)
            },
            |mopi| mopi.read_config_raw(input),
        )
    }

    /// As [`Self::write_config`], taking the five values in the order
    /// [`Self::read_config_raw`] returns them.
    pub fn write_config_raw(
        &mut self,
        values: [u32; CONFIG_BLOCK_LEN],
        input: Input,
    ) -> Result<(), T::Error> {
        let profile = BatteryProfile::try_from(values)?;
        self.write_config(&profile, input)
    }

    /// Set the power on delay in seconds. `0` disables it.
    pub fn set_power_on_delay(&mut self, seconds: u32) -> Result<(), T::Error> {
        self.write_word(MopiRegister::PowerOnDelay, seconds)
    }

    /// Set the shutdown delay in seconds. `0` disables it.
    pub fn set_shutdown_delay(&mut self, seconds: u32) -> Result<(), T::Error> {
        self.write_word(MopiRegister::ShutdownDelay, seconds)
    }

    /// Return the power on delay in seconds.
    pub fn get_power_on_delay(&mut self) -> Result<u16, T::Error> {
        self.read_word(MopiRegister::PowerOnDelay)
    }

    /// Return the shutdown delay in seconds.
    pub fn get_shutdown_delay(&mut self) -> Result<u16, T::Error> {
        self.read_word(MopiRegister::ShutdownDelay)
    }

    /// Set the power on delay. Sub-second parts are dropped.
    pub fn set_power_on_delay_duration(&mut self, delay: Duration<u32, 1, 1>) -> Result<(), T::Error> {
        self.set_power_on_delay(delay.to_secs())
    }

    /// Set the shutdown delay. Sub-second parts are dropped.
    pub fn set_shutdown_delay_duration(&mut self, delay: Duration<u32, 1, 1>) -> Result<(), T::Error> {
        self.set_shutdown_delay(delay.to_secs())
    }

    pub fn get_power_on_delay_duration(&mut self) -> Result<Duration<u32, 1, 1>, T::Error> {
        let seconds = self.get_power_on_delay()? as u32;
        Ok(Duration::<u32, 1, 1>::secs(seconds))
    }

    pub fn get_shutdown_delay_duration(&mut self) -> Result<Duration<u32, 1, 1>, T::Error> {
        let seconds = self.get_shutdown_delay()? as u32;
        Ok(Duration::<u32, 1, 1>::secs(seconds))
    }

    /// Read the firmware version from the board.
    ///
    /// See [`Self::firmware`] for the version read when connecting.
    pub fn get_firmware_version(&mut self) -> Result<FirmwareVersion, T::Error> {
        let word = self.read_word(MopiRegister::FirmwareVersion)?;
        Ok(FirmwareVersion::from(word))
    }

    pub fn get_serial_number(&mut self) -> Result<u16, T::Error> {
        self.read_word(MopiRegister::SerialNumber)
    }

    /// Read a word register, retrying while the bus has no data.
    pub fn read_word(&mut self, register: MopiRegister) -> Result<u16, T::Error> {
        let data = self.base_read_word(register)?;
        if self.options.read_check == ReadCheck::Sentinel || data & SUSPECT_BITS == 0 {
            return Ok(data);
        }

        let second = self.base_read_word(register)?;
        if second == data {
            return Ok(data);
        }
        let third = self.base_read_word(register)?;
        if third == second {
            debug!("{:?} settled on {:#06x} after {:#06x}", register, second, data);
            Ok(second)
        } else {
            warn!(
                "{:?} inconsistent: {:#06x}, {:#06x}, {:#06x}",
                register, data, second, third
            );
            Err(Error::InconsistentRead)
        }
    }

    /// Write a word register and confirm it by reading it back.
    ///
    /// `value` must fit in 16 bits. Nothing is written if the register already
    /// holds `value`.
    pub fn write_word(&mut self, register: MopiRegister, value: u32) -> Result<(), T::Error> {
        let word = u16::try_from(value).map_err(|_| InvalidParameter::WordValue(value))?;
        let address = self.options.address;
        let tries = self.options.tries();

        retry::write_verified(
            self,
            register,
            tries,
            &word,
            |mopi| {
                mopi.transport
                    .write_word(address, register.into(), word)
                    .map_err(Error::Transport)
            },
            |mopi| mopi.read_word(register),
        )
    }

    fn base_read_word(&mut self, register: MopiRegister) -> Result<u16, T::Error> {
        let address = self.options.address;
        let tries = self.options.tries();
        retry::read_until_data(self, register, tries, |mopi| {
            mopi.transport
                .read_word(address, register.into())
                .map_err(Error::Transport)
        })
    }

    fn read_config_block(&mut self, input: Input) -> Result<[u8; CONFIG_BLOCK_LEN], T::Error> {
        let mut block = [0u8; CONFIG_BLOCK_LEN];
        let register = input.config_register();
        let len = self
            .transport
            .read_block(self.options.address, register.into(), &mut block)
            .map_err(Error::Transport)?;
        if len < CONFIG_BLOCK_LEN {
            warn!("{:?} returned {} of {} bytes", register, len, CONFIG_BLOCK_LEN);
            return Err(Error::InvalidResponse);
        }
        Ok(block)
    }
}
