//! Sensor lifecycle: probe, init, stream control and mode switching.
//!
//! ```text
//!  Uninitialized ──probe──▶ Probed ──init──▶ Initialized ⇄ Standby
//!                                              │ restart
//!                                              ▼
//!                                           Streaming ──exit──▶ Exited
//! ```
//!
//! These are the only context operations that touch the bus directly.
//! Bus failures are reported once and never retried; a caller that wants
//! another attempt re-runs `init` from scratch.

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::error::{Error, Result, TransportError, Unsupported};
use crate::ports::RegisterTransport;
use crate::regs;
use crate::types::{ImageModeInfo, Pipe, RegWrite};

use super::context::{LifecycleState, SensorContext};
use super::modes::{ModeDescriptor, ModeId, SENSOR_MAX_HEIGHT, SENSOR_MAX_WIDTH};

/// Registers written by `init` for `mode`: standby first, then line and
/// frame length, each high byte first.
pub fn init_burst(mode: &ModeDescriptor) -> [RegWrite; 5] {
    let (hts_h, hts_l) = regs::split_u16(mode.hts_def as u16);
    let (vts_h, vts_l) = regs::split_u16(mode.vts_def as u16);
    [
        RegWrite::new(regs::MODE_SELECT, regs::MODE_STANDBY),
        RegWrite::new(regs::LINE_LENGTH_H, hts_h),
        RegWrite::new(regs::LINE_LENGTH_L, hts_l),
        RegWrite::new(regs::FRAME_LENGTH_H, vts_h),
        RegWrite::new(regs::FRAME_LENGTH_L, vts_l),
    ]
}

fn read_chip_id<T: RegisterTransport + ?Sized>(
    bus: &mut T,
    pipe: Pipe,
) -> core::result::Result<u16, TransportError> {
    let hi = bus.read(pipe, regs::CHIP_ID_H)?;
    let lo = bus.read(pipe, regs::CHIP_ID_L)?;
    Ok(u16::from_be_bytes([hi, lo]))
}

impl SensorContext {
    /// Open the bus and check the chip identity.  The bus stays open only
    /// if the sensor answered with the expected id.
    pub fn probe<T: RegisterTransport + ?Sized>(&mut self, pipe: Pipe, bus: &mut T) -> Result<()> {
        bus.open(pipe)?;
        let found = match read_chip_id(bus, pipe) {
            Ok(id) => id,
            Err(e) => {
                error!("pipe {}: chip id read failed: {}", pipe, e);
                bus.close(pipe);
                return Err(e.into());
            }
        };
        if found != regs::CHIP_ID {
            error!(
                "pipe {}: chip id 0x{:04X}, expected 0x{:04X}",
                pipe,
                found,
                regs::CHIP_ID
            );
            bus.close(pipe);
            return Err(Error::IdMismatch {
                expected: regs::CHIP_ID,
                found,
            });
        }
        info!("pipe {}: IMX708 detected", pipe);
        self.transition(pipe.id(), LifecycleState::Probed);
        Ok(())
    }

    /// Write the active mode's timing burst.  Opens the bus if needed.
    ///
    /// A failed burst leaves `initialized` unchanged; the error names the
    /// first register that did not reach the sensor.
    pub fn init<T: RegisterTransport + ?Sized>(&mut self, pipe: Pipe, bus: &mut T) -> Result<()> {
        bus.open(pipe)?;
        let mode = self.descriptor();
        if let Err(e) = bus.write_burst(pipe, &init_burst(mode)) {
            error!("pipe {}: init burst for {} failed: {}", pipe, mode.name, e);
            return Err(e.into());
        }
        // The sensor now runs at the mode's default timing.
        self.load_mode(self.mode);
        self.initialized = true;
        info!("pipe {}: initialized {}", pipe, mode.name);
        self.transition(pipe.id(), LifecycleState::Initialized);
        Ok(())
    }

    pub fn standby<T: RegisterTransport + ?Sized>(&mut self, pipe: Pipe, bus: &mut T) -> Result<()> {
        bus.write(pipe, regs::MODE_SELECT, regs::MODE_STANDBY)?;
        self.transition(pipe.id(), LifecycleState::Standby);
        Ok(())
    }

    /// Start streaming, then block for `settle_ms`.
    pub fn restart<T: RegisterTransport + ?Sized, D: DelayNs>(
        &mut self,
        pipe: Pipe,
        bus: &mut T,
        delay: &mut D,
        settle_ms: u32,
    ) -> Result<()> {
        bus.write(pipe, regs::MODE_SELECT, regs::MODE_STREAMING)?;
        delay.delay_ms(settle_ms);
        self.transition(pipe.id(), LifecycleState::Streaming);
        Ok(())
    }

    pub fn exit<T: RegisterTransport + ?Sized>(&mut self, pipe: Pipe, bus: &mut T) {
        bus.close(pipe);
        self.initialized = false;
        self.transition(pipe.id(), LifecycleState::Exited);
    }

    /// Select the mode matching `width`x`height` exactly.
    ///
    /// A running sensor switching to a different mode is put in standby and
    /// re-initialized; otherwise only the context is updated.  Pending writes
    /// are discarded on a switch.  If the switch fails the pipe is left
    /// uninitialized in the new mode, and the next `init` writes its burst.
    pub fn set_image_mode<T: RegisterTransport + ?Sized>(
        &mut self,
        pipe: Pipe,
        bus: &mut T,
        width: u32,
        height: u32,
    ) -> Result<ImageModeInfo> {
        let Some(mode) = ModeId::from_resolution(width, height) else {
            warn!("pipe {}: unsupported resolution {}x{}", pipe, width, height);
            return Err(Unsupported::Resolution { width, height }.into());
        };

        if self.initialized {
            if mode != self.mode {
                info!(
                    "pipe {}: switching {} -> {}",
                    pipe,
                    self.descriptor().name,
                    mode.descriptor().name
                );
                // Writes queued for the old mode must not reach the new one.
                self.batch.clear();
                let switched = match self.standby(pipe, bus) {
                    Ok(()) => {
                        self.load_mode(mode);
                        self.init(pipe, bus)
                    }
                    Err(e) => Err(e),
                };
                if let Err(e) = switched {
                    self.load_mode(mode);
                    self.initialized = false;
                    error!("pipe {}: mode switch failed, re-run init: {}", pipe, e);
                    return Err(e);
                }
            }
        } else {
            self.load_mode(mode);
        }

        Ok(ImageModeInfo {
            fps: self.descriptor().max_fps,
            max_width: SENSOR_MAX_WIDTH,
            max_height: SENSOR_MAX_HEIGHT,
        })
    }
}
