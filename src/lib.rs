//! This crate provides an interface for monitoring and configuring the MoPi battery power add-on board for the Raspberry Pi.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! The board sits on the Pi's I2C bus at address `0x0B` and exposes a handful of
//! registers:
//! * a status word, see [`status::Status`].
//! * measured voltages of up to three inputs.
//! * a battery profile per input, see [`profile::BatteryProfile`].
//! * power on and shutdown delays.
//! * firmware version and serial number.
//!
//! Firmware v3.05 or later (within major version 3) is required.
//!
//! ```no_run
//! # fn demo<B: simbamon::transport::SmbusTransport>(bus: B) -> simbamon::error::Result<(), B::Error> {
//! use simbamon::{mopi::Mopi, register::Input};
//!
//! let mut mopi = Mopi::new(bus)?;
//! println!("{}", mopi.get_status_summary()?);
//! println!("Input #1: {}mV", mopi.get_voltage_mv(Input::Input0)?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(feature = "no-std", no_std)]

pub mod board;
pub mod config;
pub mod error;
pub mod mopi;
pub mod profile;
pub mod register;
mod retry;
pub mod status;
pub mod transport;

#[cfg(test)]
mod mock_bus;

/// Version of this interface to the board.
pub const API_VERSION: &str = "0.3";
