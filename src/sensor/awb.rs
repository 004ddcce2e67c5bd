//! AWB negotiation surface and static ISP tuning getters.

use log::debug;

use crate::types::{AwbDefaults, BlackLevel, IspDefaults};

use super::context::SensorContext;

/// Unity white-balance gain (Q10).
const UNITY_WB_GAIN: u16 = 1024;

impl SensorContext {
    /// Neutral starting gains; the AWB library converges from here.
    pub fn awb_defaults(&self) -> AwbDefaults {
        AwbDefaults {
            r_gain: UNITY_WB_GAIN,
            g_gain: UNITY_WB_GAIN,
            b_gain: UNITY_WB_GAIN,
            run_interval: 1,
        }
    }

    /// No sensor-specific noise profile is calibrated; the ISP keeps its own.
    pub fn isp_defaults(&self) -> IspDefaults {
        debug!("no noise calibration for {}", self.descriptor().name);
        IspDefaults::default()
    }

    pub fn black_level(&self) -> BlackLevel {
        BlackLevel::default()
    }
}
