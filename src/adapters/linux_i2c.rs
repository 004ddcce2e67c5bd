//! `/dev/i2c-N` bus factory for Linux targets.

use linux_embedded_hal::I2cdev;
use log::warn;

use crate::error::TransportError;
use crate::ports::BusFactory;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxI2cFactory;

impl BusFactory for LinuxI2cFactory {
    type Bus = I2cdev;

    fn open(&mut self, bus: u8) -> Result<I2cdev, TransportError> {
        let path = format!("/dev/i2c-{bus}");
        I2cdev::new(&path).map_err(|e| {
            warn!("{}: {}", path, e);
            TransportError::Open { bus }
        })
    }
}
