//! IMX708 bring-up tool.
//!
//! Registers pipe 0, probes and initializes the sensor on its real
//! `/dev/i2c-N` bus, starts streaming and plays the pipeline's role for a
//! few frames: AE requests in, one drained batch per frame out to the bus.
//!
//! ```text
//! imx708-bringup [config.json]
//! ```

use anyhow::{Context, Result};
use log::{info, warn};

use imx708_ctl::adapters::linux_i2c::LinuxI2cFactory;
use imx708_ctl::adapters::time::StdDelay;
use imx708_ctl::ports::{AeOps, AwbOps, RegisterTransport, SensorOps};
use imx708_ctl::types::Pipe;
use imx708_ctl::{DriverConfig, Imx708};

const FRAMES: u32 = 8;

fn load_config() -> Result<DriverConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            DriverConfig::from_json(&json).with_context(|| format!("parsing {path}"))
        }
        None => Ok(DriverConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let mut drv = Imx708::with_bus_factory(config, LinuxI2cFactory, StdDelay)?;
    let pipe = Pipe::new(0)?;

    let attr = drv.register(pipe)?;
    info!("{} on i2c-{} @ 0x{:02X}", attr.name, attr.bus, attr.i2c_addr);

    drv.probe(pipe).context("probe")?;
    drv.init(pipe).context("init")?;

    let ae = drv.ae_defaults(pipe)?;
    let awb = drv.awb_defaults(pipe)?;
    info!(
        "AE: {} lines/frame, {}..{} fps, init exposure {}; AWB gains {}/{}/{}",
        ae.full_lines_std, ae.min_fps, ae.fps, ae.init_exposure, awb.r_gain, awb.g_gain, awb.b_gain
    );

    drv.restart(pipe).context("restart")?;

    let mut exposure = ae.init_exposure;
    for frame in 0..FRAMES {
        let applied = drv.update_integration_time(pipe, exposure)?;
        let (again, dgain) = drv.update_gains(pipe, ae.min_again + frame * 64, ae.min_dgain)?;

        let sync = drv.register_sync_info(pipe)?;
        if sync.needs_update() {
            drv.transport_mut()
                .write_burst(pipe, &sync.writes)
                .with_context(|| format!("frame {frame}: shipping batch"))?;
        }
        info!(
            "frame {}: exposure {} again {} dgain 0x{:X} ({} writes)",
            frame,
            applied,
            again,
            dgain,
            sync.writes.len()
        );
        exposure = exposure.saturating_mul(2);
    }

    if let Err(e) = drv.standby(pipe) {
        warn!("standby: {}", e);
    }
    drv.exit(pipe)?;
    drv.unregister(pipe);
    Ok(())
}
