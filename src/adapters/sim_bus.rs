//! In-memory IMX708 on an `embedded-hal` I2C bus.
//!
//! Behaves like the real part at the byte level: a two-byte big-endian
//! register pointer, auto-increment on data bytes, NACK on a foreign device
//! address.  Failures can be injected per register so host tests can
//! exercise the error paths of probe, init and burst writes.
//!
//! [`SimSensor`] is a cheap shared handle; every [`SimBus`] opened from a
//! [`SimBusFactory`] talks to the same register file.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::error::TransportError;
use crate::ports::BusFactory;
use crate::regs;
use crate::types::RegWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimBusError(pub ErrorKind);

impl i2c::Error for SimBusError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct SimState {
    address: u8,
    registers: BTreeMap<u16, u8>,
    writes: Vec<RegWrite>,
    pointer: u16,
    opens: usize,
    fail_open: bool,
    fail_reads: bool,
    fail_write_at: Option<u16>,
}

/// Shared handle to the simulated sensor's register file.
#[derive(Debug, Clone)]
pub struct SimSensor {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSensor {
    /// A sensor answering at the default address with the IMX708 identity.
    pub fn new() -> Self {
        let sensor = Self {
            state: Arc::new(Mutex::new(SimState {
                address: regs::I2C_ADDR,
                registers: BTreeMap::new(),
                writes: Vec::new(),
                pointer: 0,
                opens: 0,
                fail_open: false,
                fail_reads: false,
                fail_write_at: None,
            })),
        };
        sensor.set_chip_id(regs::CHIP_ID);
        sensor
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_chip_id(&self, id: u16) {
        let (hi, lo) = regs::split_u16(id);
        let mut s = self.lock();
        s.registers.insert(regs::CHIP_ID_H, hi);
        s.registers.insert(regs::CHIP_ID_L, lo);
    }

    pub fn register(&self, addr: u16) -> Option<u8> {
        self.lock().registers.get(&addr).copied()
    }

    /// Every register write seen on the wire, in order.
    pub fn writes(&self) -> Vec<RegWrite> {
        self.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    pub fn fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// NACK the data byte of any write to `addr`.
    pub fn fail_writes_at(&self, addr: u16) {
        self.lock().fail_write_at = Some(addr);
    }

    pub fn clear_failures(&self) {
        let mut s = self.lock();
        s.fail_open = false;
        s.fail_reads = false;
        s.fail_write_at = None;
    }
}

/// One open handle onto a [`SimSensor`].
#[derive(Debug)]
pub struct SimBus {
    sensor: SimSensor,
}

impl ErrorType for SimBus {
    type Error = SimBusError;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut s = self.sensor.lock();
        if address != s.address {
            return Err(SimBusError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((ptr, data)) = bytes.split_first_chunk::<{ regs::ADDR_BYTES }>()
                    else {
                        return Err(SimBusError(ErrorKind::Other));
                    };
                    s.pointer = u16::from_be_bytes(*ptr);
                    for &value in data {
                        let addr = s.pointer;
                        if s.fail_write_at == Some(addr) {
                            return Err(SimBusError(ErrorKind::NoAcknowledge(
                                NoAcknowledgeSource::Data,
                            )));
                        }
                        s.registers.insert(addr, value);
                        s.writes.push(RegWrite::new(addr, value));
                        s.pointer = addr.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    if s.fail_reads {
                        return Err(SimBusError(ErrorKind::Bus));
                    }
                    for byte in buf.iter_mut() {
                        *byte = s.registers.get(&s.pointer).copied().unwrap_or(0);
                        s.pointer = s.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Hands out [`SimBus`] handles for any bus number.
#[derive(Debug, Clone)]
pub struct SimBusFactory {
    sensor: SimSensor,
}

impl SimBusFactory {
    pub fn new(sensor: SimSensor) -> Self {
        Self { sensor }
    }

    pub fn sensor(&self) -> &SimSensor {
        &self.sensor
    }
}

impl BusFactory for SimBusFactory {
    type Bus = SimBus;

    fn open(&mut self, bus: u8) -> Result<SimBus, TransportError> {
        let mut s = self.sensor.lock();
        if s.fail_open {
            return Err(TransportError::Open { bus });
        }
        s.opens += 1;
        drop(s);
        Ok(SimBus {
            sensor: self.sensor.clone(),
        })
    }
}
