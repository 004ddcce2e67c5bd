//! Port traits: the boundary between the sensor control plane and the
//! outside world.
//!
//! ```text
//!   ISP framework ──▶ SensorOps / AeOps / AwbOps / FocusOps / OisOps ──▶ Imx708
//!                                                                          │
//!   control bus   ◀── RegisterTransport ◀── I2cTransport<BusFactory> ◀─────┘
//! ```
//!
//! Upward, the [`Imx708`](crate::driver::Imx708) facade implements the
//! capability traits the ISP framework calls once per frame.  Downward, the
//! sensor code only ever talks to a [`RegisterTransport`], so tests swap in
//! an in-memory bus without touching any sensor logic.

use embedded_hal::i2c::I2c;

use crate::error::{Result, TransportError};
use crate::types::{
    AeDefaults, AwbDefaults, BlackLevel, FocusStatus, FswdrMode, ImageModeInfo, IntTimeLimits,
    IspDefaults, Orientation, Pipe, PixelFormat, RegWrite, SyncInfo, WdrMode,
};

// ───────────────────────────────────────────────────────────────
// Register transport (driven adapter: sensor → control bus)
// ───────────────────────────────────────────────────────────────

/// Byte-wide register access to one sensor per pipe.
///
/// Addresses are 16 bits, data 8 bits.  Implementations never retry: a
/// failed access is reported once and the caller decides what to do.
pub trait RegisterTransport {
    /// Open the pipe's bus.  Opening an already-open pipe is a no-op.
    fn open(&mut self, pipe: Pipe) -> core::result::Result<(), TransportError>;

    /// Release the pipe's bus.  Closing a closed pipe is a no-op.
    fn close(&mut self, pipe: Pipe);

    fn is_open(&self, pipe: Pipe) -> bool;

    /// Bus number this pipe is (or would be) opened on.
    fn bus(&self, pipe: Pipe) -> Option<u8>;

    /// Point `pipe` at `bus`.  Takes effect on the next open.
    fn set_bus(&mut self, pipe: Pipe, bus: u8);

    fn read(&mut self, pipe: Pipe, addr: u16) -> core::result::Result<u8, TransportError>;

    fn write(&mut self, pipe: Pipe, addr: u16, value: u8) -> core::result::Result<(), TransportError>;

    /// Write `writes` in order, stopping at the first failure.  Entries
    /// before the failing one have reached the sensor.
    fn write_burst(
        &mut self,
        pipe: Pipe,
        writes: &[RegWrite],
    ) -> core::result::Result<(), TransportError> {
        for (index, w) in writes.iter().enumerate() {
            match self.write(pipe, w.addr, w.value) {
                Ok(()) => {}
                Err(TransportError::Write { addr, kind }) => {
                    return Err(TransportError::Burst { index, addr, kind });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Opens a concrete I2C bus by number.  The OS-specific part of the
/// transport lives behind this trait.
pub trait BusFactory {
    type Bus: I2c;

    fn open(&mut self, bus: u8) -> core::result::Result<Self::Bus, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Capability traits (driving side: ISP framework → sensor)
// ───────────────────────────────────────────────────────────────

/// Sensor lifecycle, mode selection and per-frame register sync.
pub trait SensorOps {
    /// Verify the chip identity.  Leaves the bus open on success.
    fn probe(&mut self, pipe: Pipe) -> Result<()>;

    /// Open the bus if needed and write the active mode's register burst.
    fn init(&mut self, pipe: Pipe) -> Result<()>;

    /// Close the bus.
    fn exit(&mut self, pipe: Pipe) -> Result<()>;

    /// Reset the pipe's context to defaults.
    fn global_init(&mut self, pipe: Pipe) -> Result<()>;

    fn standby(&mut self, pipe: Pipe) -> Result<()>;

    /// Start streaming and wait for the sensor to settle.
    fn restart(&mut self, pipe: Pipe) -> Result<()>;

    fn set_image_mode(&mut self, pipe: Pipe, width: u32, height: u32) -> Result<ImageModeInfo>;

    fn set_wdr_mode(&mut self, pipe: Pipe, mode: WdrMode) -> Result<()>;

    fn isp_defaults(&mut self, pipe: Pipe) -> Result<IspDefaults>;

    fn black_level(&mut self, pipe: Pipe) -> Result<BlackLevel>;

    /// Drain this frame's queued writes.  Called once per vertical sync.
    fn register_sync_info(&mut self, pipe: Pipe) -> Result<SyncInfo>;

    fn set_pixel_format(&mut self, pipe: Pipe, format: PixelFormat) -> Result<()>;

    fn set_mirror_flip(&mut self, pipe: Pipe, orientation: Orientation) -> Result<()>;
}

/// Hooks the AE library calls.  Requests saturate rather than fail.
pub trait AeOps {
    fn ae_defaults(&mut self, pipe: Pipe) -> Result<AeDefaults>;

    fn set_fps(&mut self, pipe: Pipe, fps: f32) -> Result<AeDefaults>;

    /// Returns the applied integration time, in lines.
    fn update_integration_time(&mut self, pipe: Pipe, lines: u32) -> Result<u32>;

    /// Returns the applied `(again, dgain)`.
    fn update_gains(&mut self, pipe: Pipe, again: u32, dgain: u32) -> Result<(u32, u32)>;

    fn again_calc_table(&mut self, pipe: Pipe, requested: u32) -> Result<(u32, u32)>;

    fn dgain_calc_table(&mut self, pipe: Pipe, requested: u32) -> Result<(u32, u32)>;

    fn inttime_max(&mut self, pipe: Pipe, ratio: &[u32], limits: &mut IntTimeLimits) -> Result<()>;

    fn set_fswdr_attr(&mut self, pipe: Pipe, mode: FswdrMode) -> Result<()>;
}

pub trait AwbOps {
    fn awb_defaults(&mut self, pipe: Pipe) -> Result<AwbDefaults>;
}

/// Lens focus.  The actuator is not driven yet; positions are recorded.
pub trait FocusOps {
    fn set_focus_abs(&mut self, pipe: Pipe, position: i32) -> Result<()>;

    fn trigger_autofocus(&mut self, pipe: Pipe) -> Result<()>;

    fn focus_status(&mut self, pipe: Pipe) -> Result<FocusStatus>;
}

/// Optical image stabilisation.  Not fitted on this module.
pub trait OisOps {
    fn ois_init(&mut self, _pipe: Pipe) -> Result<()> {
        Ok(())
    }

    fn ois_trigger(&mut self, _pipe: Pipe) -> Result<()> {
        Ok(())
    }
}

/// Everything the ISP framework needs from one sensor driver.
pub trait SensorDriver: SensorOps + AeOps + AwbOps + FocusOps + OisOps {}

impl<T: SensorOps + AeOps + AwbOps + FocusOps + OisOps> SensorDriver for T {}
