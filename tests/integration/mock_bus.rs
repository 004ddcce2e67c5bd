//! Mock register transport for integration tests.
//!
//! Records every bus call so tests can assert on the exact command history
//! without an I2C stack underneath.

use std::collections::HashMap;

use imx708_ctl::adapters::time::RecordingDelay;
use imx708_ctl::error::TransportError;
use imx708_ctl::ports::RegisterTransport;
use imx708_ctl::regs;
use imx708_ctl::types::{MAX_PIPES, Pipe};
use imx708_ctl::{DriverConfig, Imx708};

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCall {
    Open(u8),
    Close(u8),
    Read(u8, u16),
    Write(u8, u16, u8),
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    pub calls: Vec<BusCall>,
    pub registers: HashMap<u16, u8>,
    pub fail_open: bool,
    pub fail_write_at: Option<u16>,
    open: [bool; MAX_PIPES],
    buses: [Option<u8>; MAX_PIPES],
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        let mut registers = HashMap::new();
        registers.insert(regs::CHIP_ID_H, 0x07);
        registers.insert(regs::CHIP_ID_L, 0x08);
        Self {
            calls: Vec::new(),
            registers,
            fail_open: false,
            fail_write_at: None,
            open: [false; MAX_PIPES],
            buses: [None; MAX_PIPES],
        }
    }

    /// Register writes only, in order, for one pipe.
    pub fn writes(&self, pipe: u8) -> Vec<(u16, u8)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                BusCall::Write(p, addr, v) if p == pipe => Some((addr, v)),
                _ => None,
            })
            .collect()
    }

    pub fn opens(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BusCall::Open(_)))
            .count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterTransport for MockTransport {
    fn open(&mut self, pipe: Pipe) -> Result<(), TransportError> {
        if self.open[pipe.index()] {
            return Ok(());
        }
        let bus = self.buses[pipe.index()].ok_or(TransportError::NoBus)?;
        if self.fail_open {
            return Err(TransportError::Open { bus });
        }
        self.calls.push(BusCall::Open(pipe.id()));
        self.open[pipe.index()] = true;
        Ok(())
    }

    fn close(&mut self, pipe: Pipe) {
        if std::mem::take(&mut self.open[pipe.index()]) {
            self.calls.push(BusCall::Close(pipe.id()));
        }
    }

    fn is_open(&self, pipe: Pipe) -> bool {
        self.open[pipe.index()]
    }

    fn bus(&self, pipe: Pipe) -> Option<u8> {
        self.buses[pipe.index()]
    }

    fn set_bus(&mut self, pipe: Pipe, bus: u8) {
        self.buses[pipe.index()] = Some(bus);
    }

    fn read(&mut self, pipe: Pipe, addr: u16) -> Result<u8, TransportError> {
        if !self.open[pipe.index()] {
            return Err(TransportError::NotOpen);
        }
        self.calls.push(BusCall::Read(pipe.id(), addr));
        Ok(self.registers.get(&addr).copied().unwrap_or(0))
    }

    fn write(&mut self, pipe: Pipe, addr: u16, value: u8) -> Result<(), TransportError> {
        if !self.open[pipe.index()] {
            return Err(TransportError::NotOpen);
        }
        if self.fail_write_at == Some(addr) {
            return Err(TransportError::Write {
                addr,
                kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            });
        }
        self.calls.push(BusCall::Write(pipe.id(), addr, value));
        self.registers.insert(addr, value);
        Ok(())
    }
}

// ── Driver fixture ────────────────────────────────────────────

pub type MockDriver = Imx708<MockTransport, RecordingDelay>;

pub fn driver() -> MockDriver {
    Imx708::new(DriverConfig::default(), MockTransport::new(), RecordingDelay::new())
        .expect("default config is valid")
}

pub fn pipe(i: usize) -> Pipe {
    Pipe::new(i).expect("pipe index in range")
}
