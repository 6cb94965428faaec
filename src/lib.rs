// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross

//! A pure-Rust driver for the Aptina MT9V032 wide-VGA global-shutter image
//! sensor, controlled over I²C.
//!
//! The sensor is a 752×480 CMOS imager aimed at automotive and machine-vision
//! work. All of its runtime behavior is programmed through 16-bit registers
//! behind 8-bit addresses: this crate detects the chip, loads its known-good
//! power-on configuration, and then exposes the handful of things worth
//! changing at runtime — exposure, analog gain, image flips, and the
//! hardware's own exposure/gain loops — along with the power sequencing the
//! surrounding board expects.
//!
//! This library uses the [`embedded-hal`][embedded-hal] blocking I²C and
//! delay traits, so it should work on any platform with an `embedded-hal`
//! implementation available. It is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/0.2/embedded_hal/blocking/index.html
//!
//! # Bringing the sensor up
//! ```no_run
//! use linux_embedded_hal::{Delay, I2cdev};
//! use mt9v032::{Config, Mt9v032, Platform, PowerState};
//!
//! // The sensor's clock and power rails belong to the board, not the chip;
//! // tell the driver how to reach them.
//! struct BoardHooks;
//!
//! impl Platform for BoardHooks {
//!     type Error = core::convert::Infallible;
//!     type PrivateData = ();
//!
//!     fn set_power(&mut self, _state: PowerState) -> Result<(), Self::Error> {
//!         // Toggle the sensor's power rail here.
//!         Ok(())
//!     }
//!
//!     fn set_clock(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
//!         // Route the requested frequency to the sensor's clock input.
//!         Ok(frequency_hz)
//!     }
//!
//!     fn private_data(&self) -> Self::PrivateData {}
//! }
//!
//! let bus = I2cdev::new("/dev/i2c-2").expect("/dev/i2c-2 needs to be an I2C controller");
//! // The address straps select 0x48, 0x4C, 0x58, or 0x5C.
//! let mut sensor = Mt9v032::new(bus, 0x48, Delay, BoardHooks, Config::default());
//! // Powering on detects the chip, applies the full configuration, and
//! // starts streaming.
//! sensor.set_power(PowerState::On)?;
//! let format = sensor.format();
//! println!("{}x{}, {} bytes per frame", format.width, format.height, format.size_image);
//! # Ok::<(), mt9v032::Error<I2cdev>>(())
//! ```
//!
//! # Driver state and the register mirrors
//! The driver keeps a mirror of every register it changes at runtime, updated
//! only when a write succeeds. Reading a control goes through the mirrors and
//! never touches the bus, which matters once the hardware exposure or gain
//! loop is running: the loop's current pick is the sensor's business, the
//! last commanded value is the driver's.
//!
//! Setting a manual exposure or gain while the matching automatic loop is
//! enabled turns that loop off first — a manual value always wins. The
//! driver also remembers every control change in its [`Config`], so cycling
//! power reapplies the configuration *as last adjusted*, not as originally
//! constructed.
//!
//! # Power sequencing
//! Transitions run through [`PowerState`]: entering `On` raises the external
//! clock, sequences the board's power callback, detects the chip the first
//! time through, reapplies the full register configuration, and starts
//! streaming. Leaving `On` parks the sensor in snapshot mode before the
//! clock and rails go down, so it is never cut off mid-frame. A failed
//! transition leaves the driver in its previous state; there is no terminal
//! failure state, so the caller is free to retry.

#![no_std]

pub mod control;
pub mod driver;
pub mod error;
pub mod format;
pub mod platform;
pub mod register;
#[cfg(test)]
mod test;
mod util;

pub use control::{ControlDescriptor, ControlId, ControlKind, CONTROLS};
pub use driver::{Config, Mt9v032, SensorVariant, EXTCLK_HZ};
pub use error::{DriverError, Error};
pub use format::*;
pub use platform::{Platform, PowerState};
pub use register::*;
