//! Register transport over any `embedded-hal` I2C bus.
//!
//! One bus handle per pipe, opened lazily from the pipe's configured bus
//! number through a [`BusFactory`].  Register addresses go out big-endian
//! ahead of the data byte; reads are a combined write-read.

use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, trace, warn};

use crate::error::TransportError;
use crate::ports::{BusFactory, RegisterTransport};
use crate::types::{MAX_PIPES, Pipe};

pub struct I2cTransport<F: BusFactory> {
    factory: F,
    address: u8,
    buses: [Option<u8>; MAX_PIPES],
    handles: [Option<F::Bus>; MAX_PIPES],
}

impl<F: BusFactory> I2cTransport<F> {
    /// `address` is the 7-bit device address; `buses` maps pipe index to
    /// bus number.
    pub fn new(factory: F, address: u8, buses: [Option<u8>; MAX_PIPES]) -> Self {
        Self {
            factory,
            address,
            buses,
            handles: core::array::from_fn(|_| None),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn handle(&mut self, pipe: Pipe) -> Result<&mut F::Bus, TransportError> {
        self.handles[pipe.index()]
            .as_mut()
            .ok_or(TransportError::NotOpen)
    }
}

impl<F: BusFactory> RegisterTransport for I2cTransport<F> {
    fn open(&mut self, pipe: Pipe) -> Result<(), TransportError> {
        if self.handles[pipe.index()].is_some() {
            return Ok(());
        }
        let bus = self.buses[pipe.index()].ok_or(TransportError::NoBus)?;
        match self.factory.open(bus) {
            Ok(handle) => {
                debug!("pipe {}: opened i2c-{} @ 0x{:02X}", pipe, bus, self.address);
                self.handles[pipe.index()] = Some(handle);
                Ok(())
            }
            Err(e) => {
                warn!("pipe {}: {}", pipe, e);
                Err(e)
            }
        }
    }

    fn close(&mut self, pipe: Pipe) {
        if self.handles[pipe.index()].take().is_some() {
            debug!("pipe {}: bus closed", pipe);
        }
    }

    fn is_open(&self, pipe: Pipe) -> bool {
        self.handles[pipe.index()].is_some()
    }

    fn bus(&self, pipe: Pipe) -> Option<u8> {
        self.buses[pipe.index()]
    }

    fn set_bus(&mut self, pipe: Pipe, bus: u8) {
        self.buses[pipe.index()] = Some(bus);
    }

    fn read(&mut self, pipe: Pipe, addr: u16) -> Result<u8, TransportError> {
        let device = self.address;
        let mut buf = [0u8; 1];
        self.handle(pipe)?
            .write_read(device, &addr.to_be_bytes(), &mut buf)
            .map_err(|e| TransportError::Read {
                addr,
                kind: e.kind(),
            })?;
        trace!("pipe {}: rd 0x{:04X} = 0x{:02X}", pipe, addr, buf[0]);
        Ok(buf[0])
    }

    fn write(&mut self, pipe: Pipe, addr: u16, value: u8) -> Result<(), TransportError> {
        let device = self.address;
        let [hi, lo] = addr.to_be_bytes();
        self.handle(pipe)?
            .write(device, &[hi, lo, value])
            .map_err(|e| TransportError::Write {
                addr,
                kind: e.kind(),
            })?;
        trace!("pipe {}: wr 0x{:04X} = 0x{:02X}", pipe, addr, value);
        Ok(())
    }
}
