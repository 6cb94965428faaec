// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::blocking::i2c;

use crate::control::ControlId;
use crate::format::PixelFormat;
use crate::platform::PowerState;

/// Errors that don't involve the I²C bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// The chip-version register held a value this driver doesn't recognize.
    ///
    /// Either there's no sensor at the configured address, or it's a part
    /// this driver can't program.
    UnknownChipVersion(u16),

    /// A control was set to a value outside its declared bounds.
    ///
    /// The sensor is untouched when this is returned; no register write is
    /// issued for a rejected value.
    ValueOutOfRange { control: ControlId, value: i32 },

    /// The requested pixel encoding is not produced by this sensor variant.
    UnsupportedPixelFormat(PixelFormat),

    /// An enumeration index past the end of the fixed list.
    IndexOutOfRange(usize),

    /// The platform's power sequencing callback failed while entering the
    /// given state.
    ///
    /// The sensor clock has been forced off and the previously recorded
    /// power state still stands.
    PowerSequence(PowerState),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::UnknownChipVersion(raw) => {
                write!(f, "unknown chip version {:#06x}", raw)
            }
            DriverError::ValueOutOfRange { control, value } => {
                write!(f, "value {} is out of range for {:?}", value, control)
            }
            DriverError::UnsupportedPixelFormat(pixel_format) => {
                write!(f, "pixel format {:?} is not supported", pixel_format)
            }
            DriverError::IndexOutOfRange(index) => {
                write!(f, "enumeration index {} is past the end", index)
            }
            DriverError::PowerSequence(state) => {
                write!(f, "platform power sequencing toward {:?} failed", state)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

pub enum Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Errors originating from the I²C implementation while writing.
    I2cWriteError(<I2C as i2c::Write>::Error),

    /// Errors originating from the I²C implementation while reading.
    I2cWriteReadError(<I2C as i2c::WriteRead>::Error),

    /// Errors originating from within this library.
    Driver(DriverError),
}

// Custom Debug implementation so that I2C doesn't need to implement Debug (like the one from
// linux-embedded-hal).
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteError(i2c_error) => f
                .debug_tuple("Error::I2cWriteError")
                .field(i2c_error)
                .finish(),
            Error::I2cWriteReadError(i2c_error) => f
                .debug_tuple("Error::I2cWriteReadError")
                .field(i2c_error)
                .finish(),
            Error::Driver(err) => f.debug_tuple("Error::Driver").field(err).finish(),
        }
    }
}

impl<I2C> fmt::Display for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteError(i2c_error) => write!(f, "I2C write error: {:?}", i2c_error),
            Error::I2cWriteReadError(i2c_error) => write!(f, "I2C read error: {:?}", i2c_error),
            Error::Driver(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: std::error::Error + 'static,
    <I2C as i2c::Write>::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2cWriteError(i2c_error) => Some(i2c_error),
            Error::I2cWriteReadError(i2c_error) => Some(i2c_error),
            Error::Driver(driver_error) => Some(driver_error),
        }
    }
}

impl<I2C> From<DriverError> for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    fn from(driver_error: DriverError) -> Self {
        Self::Driver(driver_error)
    }
}
