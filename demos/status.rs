use std::env;

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use simbamon::{
    board::BoardRevision,
    mopi::Mopi,
    profile::ConfigBlock,
    register::{DEVICE_ADDRESS, Input},
    transport::SmbusTransport,
};
use strum::IntoEnumIterator;

/// Used when `/proc/cpuinfo` can't be read, e.g. on newer kernels in containers.
const FALLBACK_REVISION: BoardRevision = BoardRevision::Rev2;

pub struct LinuxBus(LinuxI2CDevice);

#[derive(Debug)]
pub struct BusError(LinuxI2CError);

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for BusError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

impl embedded_io::ErrorType for LinuxBus {
    type Error = BusError;
}

impl LinuxBus {
    fn select(&mut self, address: u8) -> Result<(), BusError> {
        self.0.set_slave_address(address as u16).map_err(BusError)
    }
}

impl SmbusTransport for LinuxBus {
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        self.select(address)?;
        self.0.smbus_read_word_data(register).map_err(BusError)
    }

    fn read_block(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.select(address)?;
        let data = self
            .0
            .smbus_read_i2c_block_data(register, buf.len() as u8)
            .map_err(BusError)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        self.select(address)?;
        self.0.smbus_write_word_data(register, value).map_err(BusError)
    }

    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        self.0.smbus_write_i2c_block_data(register, data).map_err(BusError)
    }
}

fn main() {
    env_logger::init();

    // Device node from command line arg, or guessed from the board revision.
    let path = env::args().nth(1).unwrap_or_else(|| {
        let revision = std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|cpuinfo| BoardRevision::from_cpuinfo(&cpuinfo))
            .unwrap_or(FALLBACK_REVISION);
        revision.i2c_device_path().to_string()
    });

    println!("Using bus: {}", path);

    let device = LinuxI2CDevice::new(&path, DEVICE_ADDRESS as u16).expect("Failed to open I2C bus");
    let mut mopi = Mopi::new(LinuxBus(device)).expect("Failed to connect to MoPi");

    println!("Firmware version: {}", mopi.firmware());
    println!("Serial number: {}", mopi.get_serial_number().unwrap());

    println!("\n--- Status ---");
    match mopi.get_status_summary() {
        Ok(summary) => println!("{}", summary),
        Err(err) => println!("Could not decode status: {}", err),
    }

    println!("\n--- Inputs ---");
    for input in Input::iter() {
        let voltage = mopi.get_voltage_mv(input).unwrap();
        match mopi.read_config(input) {
            Ok(ConfigBlock::Profile(profile)) => {
                println!("{:?}: {}mV, {:?}", input, voltage, profile)
            }
            Ok(ConfigBlock::Unset(_)) => println!("{:?}: {}mV, not configured", input, voltage),
            Err(err) => println!("{:?}: {}mV, config unreadable: {}", input, voltage, err),
        }
    }

    println!("\n--- Delays ---");
    println!("Power on delay: {}s", mopi.get_power_on_delay().unwrap());
    println!("Shutdown delay: {}s", mopi.get_shutdown_delay().unwrap());
}
