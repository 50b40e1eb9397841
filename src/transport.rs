//! The bus the MoPi hangs off.
//!
//! [`SmbusTransport`] is the small set of SMBus primitives the driver needs. Any
//! [`embedded_hal::i2c::I2c`] bus can be used through [`I2cTransport`], other
//! backends (e.g. Linux `i2c-dev`) can implement the trait directly.

use core::fmt;

use embedded_hal::i2c::{I2c, Operation};

/// SMBus style register access.
///
/// Errors are reported through [`embedded_io::ErrorType`] so that the driver
/// can classify them by [`embedded_io::ErrorKind`].
pub trait SmbusTransport: embedded_io::ErrorType {
    /// SMBus "read word data". Returns [`NO_DATA`](crate::register::NO_DATA) when
    /// the device did not drive the bus.
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error>;

    /// I2C block read of up to `buf.len()` bytes starting at `register`.
    ///
    /// Returns how many bytes the device actually sent.
    fn read_block(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// SMBus "write word data".
    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error>;

    /// I2C block write of `data` starting at `register`.
    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: SmbusTransport + ?Sized> SmbusTransport for &mut T {
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        T::read_word(self, address, register)
    }

    fn read_block(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_block(self, address, register, buf)
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        T::write_word(self, address, register, value)
    }

    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write_block(self, address, register, data)
    }
}

/// Runs the SMBus primitives over a plain I2C bus.
///
/// Words are little-endian, as SMBus specifies.
pub struct I2cTransport<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> I2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consume the transport and return the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> embedded_io::ErrorType for I2cTransport<I2C> {
    type Error = I2cError<I2C::Error>;
}

impl<I2C: I2c> SmbusTransport for I2cTransport<I2C> {
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(address, &[register], &mut buf)
            .map_err(I2cError)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_block(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // A plain I2C read is always clocked out in full.
        self.i2c.write_read(address, &[register], buf).map_err(I2cError)?;
        Ok(buf.len())
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c.write(address, &[register, lo, hi]).map_err(I2cError)
    }

    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        // Adjacent writes in one transaction go out without a repeated start.
        self.i2c
            .transaction(address, &mut [Operation::Write(&[register]), Operation::Write(data)])
            .map_err(I2cError)
    }
}

/// Wraps an [`embedded_hal::i2c::Error`] so it can be reported as an [`embedded_io::Error`].
#[derive(Debug)]
pub struct I2cError<E>(pub E);

impl<E: embedded_hal::i2c::Error> fmt::Display for I2cError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2C error: {:?}", self.0.kind())
    }
}

impl<E: embedded_hal::i2c::Error> core::error::Error for I2cError<E> {}

impl<E: embedded_hal::i2c::Error> embedded_io::Error for I2cError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_hal::i2c::ErrorKind as I2cKind;
        match self.0.kind() {
            I2cKind::NoAcknowledge(_) => embedded_io::ErrorKind::NotConnected,
            I2cKind::ArbitrationLoss => embedded_io::ErrorKind::Interrupted,
            I2cKind::Overrun => embedded_io::ErrorKind::OutOfMemory,
            I2cKind::Bus => embedded_io::ErrorKind::BrokenPipe,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}
