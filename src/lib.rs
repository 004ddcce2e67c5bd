//! IMX708 image-sensor control plane.
//!
//! Turns AE/AWB and mode requests from an ISP framework into
//! frame-synchronised register writes over the sensor's I2C control bus.
//! Bus access goes through the [`ports::RegisterTransport`] port, so the
//! whole crate runs on the host against [`adapters::sim_bus`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod driver;
pub mod error;
pub mod ports;
pub mod registry;
pub mod regs;
pub mod sensor;
pub mod transport;
pub mod types;

pub use config::DriverConfig;
pub use driver::{Imx708, SensorAttrInfo};
pub use error::{Error, Result};
