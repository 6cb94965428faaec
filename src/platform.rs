// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
//! The contract between the sensor driver and the board it sits on.
//!
//! The sensor's external clock and power rails belong to the platform, not
//! to the sensor itself. The driver sequences them through [`Platform`]
//! while it moves the sensor between power states.

use core::fmt::Debug;

/// Sensor power states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerState {
    /// Rails down, clock stopped. The initial state.
    Off,

    /// Rails up, clock stopped, register state retained.
    Standby,

    /// Rails and clock up, sensor streaming.
    On,
}

/// Board-level hooks the driver calls while sequencing power states.
pub trait Platform {
    /// Failures from the power and clock callbacks.
    type Error: Debug;

    /// Opaque per-board data handed through to the host capture framework.
    type PrivateData;

    /// Switch the sensor's power rails for the given state.
    ///
    /// Implementations are expected to do their own settling sleeps so power
    /// is stable when this returns.
    fn set_power(&mut self, state: PowerState) -> Result<(), Self::Error>;

    /// Route a clock of the given frequency to the sensor's clock input.
    ///
    /// A frequency of 0 stops the clock. Returns the frequency actually
    /// achieved, which may differ from the request.
    fn set_clock(&mut self, frequency_hz: u32) -> Result<u32, Self::Error>;

    /// The board's private data for the host capture framework.
    fn private_data(&self) -> Self::PrivateData;
}
