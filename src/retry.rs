//! Retry loops shared by word and block accesses.
//!
//! The bus is local and failures are short glitches, so there is no backoff:
//! each attempt follows the previous one immediately.

use core::fmt::Debug;

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    register::{MopiRegister, NO_DATA},
};

/// Read a word until it is something other than [`NO_DATA`].
///
/// Fails with [`Error::CommunicationIoError`] once `tries` reads in a row
/// returned the sentinel. Transport errors are returned straight away.
pub fn read_until_data<C, I>(
    ctx: &mut C,
    register: MopiRegister,
    tries: u8,
    mut read: impl FnMut(&mut C) -> Result<u16, I>,
) -> Result<u16, I>
where
    I: embedded_io::Error,
{
    for attempt in 1..=tries {
        let value = read(ctx)?;
        if value != NO_DATA {
            if attempt > 1 {
                debug!("{:?} answered on attempt {}/{}", register, attempt, tries);
            }
            return Ok(value);
        }
        warn!("no data from {:?}, attempt {}/{}", register, attempt, tries);
    }
    Err(Error::CommunicationIoError)
}

/// Write `expected` and confirm it by reading it back.
///
/// Nothing is written if the register already holds `expected`. Otherwise each
/// attempt is a write followed by a read-back, stopping at the first match.
/// Fails with [`Error::CommunicationError`] if `tries` attempts never matched.
pub fn write_verified<C, V, I>(
    ctx: &mut C,
    register: MopiRegister,
    tries: u8,
    expected: &V,
    mut write: impl FnMut(&mut C) -> Result<(), I>,
    mut read_back: impl FnMut(&mut C) -> Result<V, I>,
) -> Result<(), I>
where
    V: PartialEq + Debug,
    I: embedded_io::Error,
{
    if read_back(ctx)? == *expected {
        debug!("{:?} already holds {:?}, skipping write", register, expected);
        return Ok(());
    }

    for attempt in 1..=tries {
        write(ctx)?;
        let found = read_back(ctx)?;
        if found == *expected {
            return Ok(());
        }
        warn!(
            "{:?} read back {:?} instead of {:?}, attempt {}/{}",
            register, found, expected, attempt, tries
        );
    }
    Err(Error::CommunicationError)
}
