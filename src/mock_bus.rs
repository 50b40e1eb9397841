//! We use this mocking module in unit tests to emulate a MoPi on the bus.

use core::fmt;

use crate::{
    profile::CONFIG_BLOCK_LEN,
    register::{DEVICE_ADDRESS, MopiRegister, NO_DATA},
    transport::SmbusTransport,
};

const REGISTER_COUNT: usize = 11;

/// Our mock type used to emulate the board's register file.
pub struct MockBus {
    /// Current value of every word register.
    words: [u16; REGISTER_COUNT],
    /// Current contents of every block register.
    blocks: [[u8; CONFIG_BLOCK_LEN]; REGISTER_COUNT],
    /// Values returned by upcoming word reads, ahead of the register contents.
    scripted_reads: [heapless::Deque<u16, 8>; REGISTER_COUNT],
    /// Number of upcoming writes the board will silently ignore.
    dropped_writes: usize,
    /// Number of bytes the board sends on a block read.
    block_read_len: usize,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    pub word_reads: usize,
    pub block_reads: usize,
    pub word_writes: usize,
    pub block_writes: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockBusError {
    /// Generic simulated error for testing
    SimulatedError,
    /// The driver addressed some other device.
    WrongAddress(u8),
}

impl fmt::Display for MockBusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl core::error::Error for MockBusError {}

impl embedded_io::Error for MockBusError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockBusError::SimulatedError => embedded_io::ErrorKind::Other,
            MockBusError::WrongAddress(_) => embedded_io::ErrorKind::NotConnected,
        }
    }
}

impl embedded_io::ErrorType for MockBus {
    type Error = MockBusError;
}

impl SmbusTransport for MockBus {
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        self.check(address, self.should_error_on_read)?;
        self.word_reads += 1;
        let register = register as usize;
        Ok(self.scripted_reads[register]
            .pop_front()
            .unwrap_or(self.words[register]))
    }

    fn read_block(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.check(address, self.should_error_on_read)?;
        self.block_reads += 1;
        let block = &self.blocks[register as usize];
        let len = buf.len().min(self.block_read_len);
        buf[..len].copy_from_slice(&block[..len]);
        Ok(len)
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        self.check(address, self.should_error_on_write)?;
        self.word_writes += 1;
        if !self.drop_write() {
            self.words[register as usize] = value;
        }
        Ok(())
    }

    fn write_block(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.check(address, self.should_error_on_write)?;
        self.block_writes += 1;
        if !self.drop_write() {
            let len = data.len().min(CONFIG_BLOCK_LEN);
            self.blocks[register as usize][..len].copy_from_slice(&data[..len]);
        }
        Ok(())
    }
}

impl MockBus {
    /// Create a board running firmware 3.05 with both config blocks unset.
    pub fn new() -> Self {
        Self::with_firmware(3, 5)
    }

    pub fn with_firmware(major: u8, minor: u8) -> Self {
        let mut words = [0u16; REGISTER_COUNT];
        words[MopiRegister::Status as usize] = 0x3001;
        words[MopiRegister::Voltage0 as usize] = 7450;
        words[MopiRegister::FirmwareVersion as usize] = u16::from_be_bytes([major, minor]);
        words[MopiRegister::SerialNumber as usize] = 1234;

        Self {
            words,
            blocks: [[255u8; CONFIG_BLOCK_LEN]; REGISTER_COUNT],
            scripted_reads: core::array::from_fn(|_| heapless::Deque::new()),
            dropped_writes: 0,
            block_read_len: CONFIG_BLOCK_LEN,
            should_error_on_read: false,
            should_error_on_write: false,
            word_reads: 0,
            block_reads: 0,
            word_writes: 0,
            block_writes: 0,
        }
    }

    pub fn word(&self, register: MopiRegister) -> u16 {
        self.words[register as usize]
    }

    pub fn set_word(&mut self, register: MopiRegister, value: u16) {
        self.words[register as usize] = value;
    }

    pub fn block(&self, register: MopiRegister) -> [u8; CONFIG_BLOCK_LEN] {
        self.blocks[register as usize]
    }

    pub fn set_block(&mut self, register: MopiRegister, block: [u8; CONFIG_BLOCK_LEN]) {
        self.blocks[register as usize] = block;
    }

    /// Queue values for the next word reads of `register`.
    pub fn script_reads(&mut self, register: MopiRegister, values: &[u16]) {
        for value in values {
            self.scripted_reads[register as usize]
                .push_back(*value)
                .expect("read script too long");
        }
    }

    /// Make the next `count` reads of `register` return [`NO_DATA`].
    pub fn no_data_reads(&mut self, register: MopiRegister, count: usize) {
        for _ in 0..count {
            self.script_reads(register, &[NO_DATA]);
        }
    }

    /// Make the board ignore the next `count` writes.
    pub fn drop_writes(&mut self, count: usize) {
        self.dropped_writes = count;
    }

    /// Make block reads stop after `len` bytes.
    pub fn short_block_reads(&mut self, len: usize) {
        self.block_read_len = len.min(CONFIG_BLOCK_LEN);
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Total number of bus operations so far.
    pub fn operations(&self) -> usize {
        self.word_reads + self.block_reads + self.word_writes + self.block_writes
    }

    pub fn clear_counters(&mut self) {
        self.word_reads = 0;
        self.block_reads = 0;
        self.word_writes = 0;
        self.block_writes = 0;
    }

    fn check(&self, address: u8, should_error: bool) -> Result<(), MockBusError> {
        if address != DEVICE_ADDRESS {
            return Err(MockBusError::WrongAddress(address));
        }
        if should_error {
            return Err(MockBusError::SimulatedError);
        }
        Ok(())
    }

    fn drop_write(&mut self) -> bool {
        if self.dropped_writes > 0 {
            self.dropped_writes -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_round_trip() {
        let mut bus = MockBus::new();
        bus.write_word(DEVICE_ADDRESS, 3, 60).unwrap();
        assert_eq!(bus.read_word(DEVICE_ADDRESS, 3).unwrap(), 60);
        assert_eq!(bus.word_writes, 1);
        assert_eq!(bus.word_reads, 1);
    }

    #[test]
    fn scripted_reads_come_first() {
        let mut bus = MockBus::new();
        bus.no_data_reads(MopiRegister::Status, 2);
        assert_eq!(bus.read_word(DEVICE_ADDRESS, 0).unwrap(), NO_DATA);
        assert_eq!(bus.read_word(DEVICE_ADDRESS, 0).unwrap(), NO_DATA);
        assert_eq!(bus.read_word(DEVICE_ADDRESS, 0).unwrap(), 0x3001);
    }

    #[test]
    fn dropped_writes() {
        let mut bus = MockBus::new();
        bus.drop_writes(1);
        bus.write_block(DEVICE_ADDRESS, 2, &[1, 13, 11, 10, 9]).unwrap();
        assert_eq!(bus.block(MopiRegister::Config0), [255; 5]);
        bus.write_block(DEVICE_ADDRESS, 2, &[1, 13, 11, 10, 9]).unwrap();
        assert_eq!(bus.block(MopiRegister::Config0), [1, 13, 11, 10, 9]);
    }

    #[test]
    fn short_block_read() {
        let mut bus = MockBus::new();
        bus.set_block(MopiRegister::Config0, [1, 13, 11, 10, 9]);
        bus.short_block_reads(3);

        let mut block = [0u8; CONFIG_BLOCK_LEN];
        assert_eq!(bus.read_block(DEVICE_ADDRESS, 2, &mut block).unwrap(), 3);
        assert_eq!(block, [1, 13, 11, 0, 0]);
    }

    #[test]
    fn simulated_errors() {
        let mut bus = MockBus::new();
        bus.set_read_error(true);
        assert_eq!(bus.read_word(DEVICE_ADDRESS, 0), Err(MockBusError::SimulatedError));
        bus.set_write_error(true);
        assert_eq!(bus.write_word(DEVICE_ADDRESS, 3, 60), Err(MockBusError::SimulatedError));
        assert_eq!(bus.word(MopiRegister::PowerOnDelay), 0);
        bus.set_read_error(false);
        assert_eq!(bus.read_word(0x0C, 0), Err(MockBusError::WrongAddress(0x0C)));
        assert_eq!(bus.operations(), 0);
    }
}
