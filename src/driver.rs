//! `Imx708` driver facade.
//!
//! Owns the configuration, the per-pipe registry, the register transport
//! and the settle-delay provider, and implements every capability trait the
//! ISP framework calls.  Each trait method resolves the pipe's context and
//! forwards to the matching [`SensorContext`] operation.
//!
//! ```text
//!  ISP ──▶ Imx708::<op>(pipe) ──▶ registry[pipe] ──▶ SensorContext::<op>
//!                                                    │
//!                                        transport ◀─┘ (lifecycle only)
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::DriverConfig;
use crate::error::Result;
use crate::ports::{
    AeOps, AwbOps, BusFactory, FocusOps, OisOps, RegisterTransport, SensorOps,
};
use crate::registry::{AllocStats, Registry};
use crate::regs;
use crate::sensor::{DriverState, SensorContext};
use crate::transport::I2cTransport;
use crate::types::{
    AeDefaults, AwbDefaults, BlackLevel, FocusStatus, FswdrMode, ImageModeInfo, IntTimeLimits,
    IspDefaults, Orientation, Pipe, PixelFormat, SyncInfo, WdrMode,
};

pub const SENSOR_NAME: &str = "IMX708";

/// Capability sub-tables this driver fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub ae: bool,
    pub awb: bool,
    pub focus: bool,
    pub ois: bool,
}

/// What the framework learns about a sensor at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAttrInfo {
    pub name: &'static str,
    pub sensor_id: u8,
    pub i2c_addr: u8,
    pub bus: u8,
    pub capabilities: Capabilities,
}

pub struct Imx708<T: RegisterTransport, D: DelayNs> {
    config: DriverConfig,
    registry: Registry,
    transport: T,
    delay: D,
}

impl<F: BusFactory, D: DelayNs> Imx708<I2cTransport<F>, D> {
    /// Driver on an I2C transport built from the config's bus map.
    pub fn with_bus_factory(config: DriverConfig, factory: F, delay: D) -> Result<Self> {
        let transport = I2cTransport::new(factory, config.i2c_addr, config.buses);
        Self::new(config, transport, delay)
    }
}

impl<T: RegisterTransport, D: DelayNs> Imx708<T, D> {
    pub fn new(config: DriverConfig, transport: T, delay: D) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Registry::new(),
            transport,
            delay,
        })
    }

    // ── Registration ──────────────────────────────────────────

    /// Create (or replace) the context for `pipe` and report the sensor's
    /// attributes.  A pipe without a configured bus gets the default one.
    pub fn register(&mut self, pipe: Pipe) -> Result<SensorAttrInfo> {
        let bus = match self.transport.bus(pipe) {
            Some(bus) => bus,
            None => {
                let bus = self.config.bus_for(pipe.index());
                self.transport.set_bus(pipe, bus);
                bus
            }
        };

        if self.registry.is_registered(pipe) {
            self.transport.close(pipe);
        }
        let mut ctx = Box::new(SensorContext::with_state(
            self.config.default_mode,
            Box::new(DriverState::default()),
        ));
        ctx.global_init(self.config.default_mode);
        self.registry.insert(pipe, ctx);
        info!("pipe {}: {} registered on i2c-{}", pipe, SENSOR_NAME, bus);

        Ok(SensorAttrInfo {
            name: SENSOR_NAME,
            sensor_id: pipe.id(),
            i2c_addr: self.config.i2c_addr,
            bus,
            capabilities: Capabilities {
                ae: true,
                awb: true,
                focus: true,
                ois: false,
            },
        })
    }

    /// Release the pipe's context.  Unregistering an empty pipe is a no-op.
    pub fn unregister(&mut self, pipe: Pipe) {
        if self.registry.remove(pipe) {
            self.transport.close(pipe);
            info!("pipe {}: unregistered", pipe);
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn context(&self, pipe: Pipe) -> Result<&SensorContext> {
        self.registry.get(pipe)
    }

    pub fn context_mut(&mut self, pipe: Pipe) -> Result<&mut SensorContext> {
        self.registry.get_mut(pipe)
    }

    pub fn alloc_stats(&self) -> AllocStats {
        self.registry.stats()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}

// ── SensorOps ─────────────────────────────────────────────────

impl<T: RegisterTransport, D: DelayNs> SensorOps for Imx708<T, D> {
    fn probe(&mut self, pipe: Pipe) -> Result<()> {
        self.registry.get_mut(pipe)?.probe(pipe, &mut self.transport)
    }

    fn init(&mut self, pipe: Pipe) -> Result<()> {
        self.registry.get_mut(pipe)?.init(pipe, &mut self.transport)
    }

    fn exit(&mut self, pipe: Pipe) -> Result<()> {
        self.registry.get_mut(pipe)?.exit(pipe, &mut self.transport);
        Ok(())
    }

    fn global_init(&mut self, pipe: Pipe) -> Result<()> {
        let mode = self.config.default_mode;
        self.registry.get_mut(pipe)?.global_init(mode);
        debug!("pipe {}: global init ({})", pipe, mode.descriptor().name);
        Ok(())
    }

    fn standby(&mut self, pipe: Pipe) -> Result<()> {
        self.registry.get_mut(pipe)?.standby(pipe, &mut self.transport)
    }

    fn restart(&mut self, pipe: Pipe) -> Result<()> {
        let settle_ms = self.config.restart_settle_ms;
        self.registry
            .get_mut(pipe)?
            .restart(pipe, &mut self.transport, &mut self.delay, settle_ms)
    }

    fn set_image_mode(&mut self, pipe: Pipe, width: u32, height: u32) -> Result<ImageModeInfo> {
        self.registry
            .get_mut(pipe)?
            .set_image_mode(pipe, &mut self.transport, width, height)
    }

    fn set_wdr_mode(&mut self, pipe: Pipe, mode: WdrMode) -> Result<()> {
        self.registry.get_mut(pipe)?.set_wdr_mode(mode)
    }

    fn isp_defaults(&mut self, pipe: Pipe) -> Result<IspDefaults> {
        Ok(self.registry.get(pipe)?.isp_defaults())
    }

    fn black_level(&mut self, pipe: Pipe) -> Result<BlackLevel> {
        Ok(self.registry.get(pipe)?.black_level())
    }

    fn register_sync_info(&mut self, pipe: Pipe) -> Result<SyncInfo> {
        let writes = self.registry.get_mut(pipe)?.drain_sync()?;
        Ok(SyncInfo {
            bus: self.transport.bus(pipe),
            i2c_addr: self.config.i2c_addr,
            addr_bytes: regs::ADDR_BYTES,
            data_bytes: regs::DATA_BYTES,
            writes,
        })
    }

    fn set_pixel_format(&mut self, pipe: Pipe, format: PixelFormat) -> Result<()> {
        self.registry.get_mut(pipe)?.set_pixel_format(format)
    }

    fn set_mirror_flip(&mut self, pipe: Pipe, orientation: Orientation) -> Result<()> {
        self.registry.get_mut(pipe)?.set_mirror_flip(orientation)
    }
}

// ── AeOps ─────────────────────────────────────────────────────

impl<T: RegisterTransport, D: DelayNs> AeOps for Imx708<T, D> {
    fn ae_defaults(&mut self, pipe: Pipe) -> Result<AeDefaults> {
        let flicker = self.config.flicker_hz;
        Ok(self.registry.get(pipe)?.ae_defaults(flicker))
    }

    fn set_fps(&mut self, pipe: Pipe, fps: f32) -> Result<AeDefaults> {
        let flicker = self.config.flicker_hz;
        self.registry.get_mut(pipe)?.set_fps(fps, flicker)
    }

    fn update_integration_time(&mut self, pipe: Pipe, lines: u32) -> Result<u32> {
        self.registry.get_mut(pipe)?.update_integration_time(lines)
    }

    fn update_gains(&mut self, pipe: Pipe, again: u32, dgain: u32) -> Result<(u32, u32)> {
        self.registry.get_mut(pipe)?.update_gains(again, dgain)
    }

    fn again_calc_table(&mut self, pipe: Pipe, requested: u32) -> Result<(u32, u32)> {
        Ok(self.registry.get(pipe)?.again_calc_table(requested))
    }

    fn dgain_calc_table(&mut self, pipe: Pipe, requested: u32) -> Result<(u32, u32)> {
        Ok(self.registry.get(pipe)?.dgain_calc_table(requested))
    }

    fn inttime_max(&mut self, pipe: Pipe, ratio: &[u32], limits: &mut IntTimeLimits) -> Result<()> {
        self.registry.get_mut(pipe)?.get_inttime_max(ratio, limits)
    }

    fn set_fswdr_attr(&mut self, pipe: Pipe, mode: FswdrMode) -> Result<()> {
        self.registry.get_mut(pipe)?.set_fswdr_attr(mode);
        Ok(())
    }
}

impl<T: RegisterTransport, D: DelayNs> AwbOps for Imx708<T, D> {
    fn awb_defaults(&mut self, pipe: Pipe) -> Result<AwbDefaults> {
        Ok(self.registry.get(pipe)?.awb_defaults())
    }
}

// ── Focus / OIS ───────────────────────────────────────────────

impl<T: RegisterTransport, D: DelayNs> FocusOps for Imx708<T, D> {
    fn set_focus_abs(&mut self, pipe: Pipe, position: i32) -> Result<()> {
        // Recorded only; the VCM is not driven.
        self.registry.get_mut(pipe)?.driver_state_mut().focus_pos = position;
        debug!("pipe {}: focus position {} recorded", pipe, position);
        Ok(())
    }

    fn trigger_autofocus(&mut self, pipe: Pipe) -> Result<()> {
        self.registry.get(pipe)?;
        debug!("pipe {}: autofocus trigger ignored", pipe);
        Ok(())
    }

    fn focus_status(&mut self, pipe: Pipe) -> Result<FocusStatus> {
        self.registry.get(pipe)?;
        Ok(FocusStatus::Idle)
    }
}

impl<T: RegisterTransport, D: DelayNs> OisOps for Imx708<T, D> {}
