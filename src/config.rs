//! Driver configuration.
//!
//! Bus wiring and timing knobs for one IMX708 driver instance.  Defaults
//! match the LicheeRV camera connector; a board with different wiring loads
//! an override from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::regs;
use crate::sensor::ModeId;
use crate::types::MAX_PIPES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// 7-bit device address.
    pub i2c_addr: u8,
    /// Bus number per pipe; `None` falls back to `default_bus` at
    /// registration.
    pub buses: [Option<u8>; MAX_PIPES],
    pub default_bus: u8,
    /// Wait after switching to streaming (milliseconds).
    pub restart_settle_ms: u32,
    /// Mode loaded by global init.
    pub default_mode: ModeId,
    /// Mains frequency for anti-flicker (Hz).
    pub flicker_hz: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let mut buses = [None; MAX_PIPES];
        buses[0] = Some(regs::DEFAULT_BUS);
        Self {
            i2c_addr: regs::I2C_ADDR,
            buses,
            default_bus: regs::DEFAULT_BUS,
            restart_settle_ms: regs::RESTART_SETTLE_MS,
            default_mode: ModeId::default(),
            flicker_hz: 50,
        }
    }
}

impl DriverConfig {
    /// Reject values the driver cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.i2c_addr == 0 || self.i2c_addr > 0x7F {
            return Err(Error::Config("i2c_addr must be a 7-bit address"));
        }
        if !matches!(self.flicker_hz, 50 | 60) {
            return Err(Error::Config("flicker_hz must be 50 or 60"));
        }
        if self.restart_settle_ms > 1000 {
            return Err(Error::Config("restart_settle_ms above 1 s"));
        }
        Ok(())
    }

    /// Parse and validate.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Bus for `pipe`, falling back to the default.
    pub fn bus_for(&self, pipe: usize) -> u8 {
        self.buses
            .get(pipe)
            .copied()
            .flatten()
            .unwrap_or(self.default_bus)
    }
}
