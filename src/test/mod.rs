// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
//! Shared test doubles for the driver tests.

extern crate alloc;

mod i2c_mock;

pub(crate) use i2c_mock::{BusOperation, MockSensorBus};

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use embedded_hal::blocking::delay::DelayMs;

use crate::platform::{Platform, PowerState};

/// Private data the mock board hands to the host framework.
const BOARD_PRIVATE_DATA: u32 = 0xB0A2D;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlatformCall {
    Power(PowerState),
    Clock(u32),
}

#[derive(Debug)]
pub(crate) struct MockPlatformError;

/// Records power and clock sequencing; the power callback can be scripted to
/// fail.
///
/// Clones share their call log, so a test can keep a handle after giving one
/// to the driver.
#[derive(Clone, Debug)]
pub(crate) struct MockPlatform {
    calls: Rc<RefCell<Vec<PlatformCall>>>,
    fail_power: Rc<Cell<bool>>,
}

impl MockPlatform {
    pub(crate) fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            fail_power: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn fail_power(&self, fail: bool) {
        self.fail_power.set(fail);
    }

    pub(crate) fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn private_data_value(&self) -> u32 {
        BOARD_PRIVATE_DATA
    }
}

impl Platform for MockPlatform {
    type Error = MockPlatformError;
    type PrivateData = u32;

    fn set_power(&mut self, state: PowerState) -> Result<(), Self::Error> {
        self.calls.borrow_mut().push(PlatformCall::Power(state));
        if self.fail_power.get() {
            Err(MockPlatformError)
        } else {
            Ok(())
        }
    }

    fn set_clock(&mut self, frequency_hz: u32) -> Result<u32, Self::Error> {
        self.calls
            .borrow_mut()
            .push(PlatformCall::Clock(frequency_hz));
        Ok(frequency_hz)
    }

    fn private_data(&self) -> u32 {
        BOARD_PRIVATE_DATA
    }
}

/// The driver's settle waits are uninteresting under test.
pub(crate) struct NoopDelay;

impl DelayMs<u16> for NoopDelay {
    fn delay_ms(&mut self, _ms: u16) {}
}
