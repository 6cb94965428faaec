// SPDX-License-Identifier: Apache-2.0
// Copyright © 2022 Will Ross
extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use core::cell::{Ref, RefCell};

use embedded_hal::blocking::i2c;

use crate::register::Reg;

const RECENT_OPERATIONS_QUEUE_LENGTH: usize = 512;

/// Chip version presented by a freshly created mock.
const DEFAULT_CHIP_VERSION: u16 = 0x1311;

#[derive(Copy, Clone, Debug)]
pub(crate) enum MockError {
    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// A transfer with a shape the sensor doesn't speak.
    ///
    /// Register writes are one address byte plus a big-endian word; register
    /// reads write one address byte and read two bytes back.
    IllegalOperation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BusOperation {
    Write { register: u8, value: u16 },
    Read { register: u8 },
}

/// A scriptable stand-in for the sensor on an I²C bus.
///
/// State lives behind `Rc<RefCell<..>>` so a cloned handle can inspect the
/// register file after the driver takes ownership of the original. Registers
/// read as zero until written, except for "forced" registers, which always
/// read the forced value and silently drop writes — that covers the
/// hard-wired chip version, the self-clearing reset register, and any
/// register a test wants to have adjust itself after a latch.
#[derive(Clone, Debug)]
pub(crate) struct MockSensorBus {
    i2c_address: u8,
    registers: Rc<RefCell<BTreeMap<u8, u16>>>,
    forced: Rc<RefCell<BTreeMap<u8, u16>>>,
    recent_operations: Rc<RefCell<VecDeque<BusOperation>>>,
    last_write: Rc<RefCell<Option<[u8; 3]>>>,
}

impl MockSensorBus {
    pub(crate) fn new(i2c_address: u8) -> Self {
        let mock = Self {
            i2c_address,
            registers: Rc::new(RefCell::new(BTreeMap::new())),
            forced: Rc::new(RefCell::new(BTreeMap::new())),
            recent_operations: Rc::new(RefCell::new(VecDeque::new())),
            last_write: Rc::new(RefCell::new(None)),
        };
        mock.force_register(Reg::ChipVersion, DEFAULT_CHIP_VERSION);
        // Reset is self-clearing: writes take effect and the register reads
        // back as zero.
        mock.force_register(Reg::Reset, 0x0000);
        mock
    }

    /// Change the value the chip-version register reports.
    pub(crate) fn set_version(&self, raw: u16) {
        self.force_register(Reg::ChipVersion, raw);
    }

    /// Pin a register to a fixed value, dropping any writes to it.
    pub(crate) fn force_register(&self, register: Reg, value: u16) {
        self.forced.borrow_mut().insert(register.into(), value);
    }

    /// The current value of a register, as the sensor would report it.
    pub(crate) fn register(&self, register: Reg) -> u16 {
        self.load(register.into())
    }

    fn load(&self, address: u8) -> u16 {
        if let Some(value) = self.forced.borrow().get(&address) {
            return *value;
        }
        self.registers.borrow().get(&address).copied().unwrap_or(0)
    }

    fn store(&self, address: u8, value: u16) {
        if self.forced.borrow().contains_key(&address) {
            return;
        }
        self.registers.borrow_mut().insert(address, value);
    }

    fn add_operation(&self, operation: BusOperation) {
        let mut recent_ops = self.recent_operations.borrow_mut();
        recent_ops.push_front(operation);
        recent_ops.truncate(RECENT_OPERATIONS_QUEUE_LENGTH);
    }

    pub(crate) fn recent_operations(&self) -> Ref<VecDeque<BusOperation>> {
        self.recent_operations.borrow()
    }

    pub(crate) fn clear_recent_operations(&self) {
        self.recent_operations.borrow_mut().clear()
    }

    /// The raw bytes of the most recent write transfer.
    pub(crate) fn last_write(&self) -> Option<[u8; 3]> {
        *self.last_write.borrow()
    }
}

impl i2c::Write for MockSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        if bytes.len() != 3 {
            return Err(MockError::IllegalOperation);
        }
        let register = bytes[0];
        let value = u16::from_be_bytes([bytes[1], bytes[2]]);
        *self.last_write.borrow_mut() = Some([bytes[0], bytes[1], bytes[2]]);
        self.store(register, value);
        self.add_operation(BusOperation::Write { register, value });
        Ok(())
    }
}

impl i2c::WriteRead for MockSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        if write_buffer.len() != 1 || out_buffer.len() != 2 {
            return Err(MockError::IllegalOperation);
        }
        let register = write_buffer[0];
        let value = self.load(register);
        out_buffer.copy_from_slice(&value.to_be_bytes());
        self.add_operation(BusOperation::Read { register });
        Ok(())
    }
}
