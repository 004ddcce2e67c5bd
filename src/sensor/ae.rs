//! Auto-exposure negotiation surface.
//!
//! The external AE library drives the sensor through these calls: it reads
//! the defaults once, then per frame asks for a frame rate, an integration
//! time and a gain pair.  Every request is clamped to what the active mode
//! and the current frame length allow, queued on the context's register
//! batch, and the applied value is reported back.  Nothing here touches the
//! bus.

use log::{debug, info, warn};

use crate::error::{Result, Unsupported};
use crate::regs;
use crate::types::{Accuracy, AeDefaults, AeExpMode, FswdrMode, IntTimeLimits, WdrMode};

use super::context::SensorContext;

/// Q8 shift of the ISP digital gain.
const ISP_DGAIN_SHIFT: u32 = 8;
const MIN_ISP_DGAIN_TARGET: u32 = 1 << ISP_DGAIN_SHIFT;
const MAX_ISP_DGAIN_TARGET: u32 = 4 << ISP_DGAIN_SHIFT;

/// Luma histogram thresholds for the AE statistics engine.
const HIST_THRESH: [u8; 4] = [0x0D, 0x28, 0x60, 0x80];

const AE_COMPENSATION: u8 = 40;
const INIT_AE_SPEED: u32 = 64;
const INIT_AE_TOLERANCE: u32 = 5;
const AE_RESPONSE_FRAME: u32 = 4;

const MAX_INT_TIME_TARGET: u32 = 65_535;
const MIN_INT_TIME_TARGET: u32 = 1;

impl SensorContext {
    /// AE seed values for the active mode.  `flicker_hz` is the mains
    /// frequency the anti-flicker logic should lock to.
    pub fn ae_defaults(&self, flicker_hz: u32) -> AeDefaults {
        let mode = self.descriptor();
        let fl = self.frame_length;
        let state = self.driver_state();

        let line_rate = fl as f32 * self.fps;
        let hmax_times = if line_rate > 0.0 {
            (1_000_000.0 / line_rate) as u32
        } else {
            1_000_000
        };

        let lines_per_500ms = match state.lines_per_500ms {
            0 => (line_rate / 2.0) as u32,
            n => n,
        };
        let init_exposure = match state.init_exposure {
            0 => mode.exposure.def,
            n => n,
        };

        AeDefaults {
            full_lines_std: fl,
            full_lines: fl,
            full_lines_max: regs::FRAME_LENGTH_MAX,
            flicker_freq: flicker_hz << 8,
            hmax_times,
            lines_per_500ms,

            int_time_accu: Accuracy::linear(1.0),
            again_accu: Accuracy::linear(1.0),
            dgain_accu: Accuracy::linear(1.0),

            isp_dgain_shift: ISP_DGAIN_SHIFT,
            min_isp_dgain_target: MIN_ISP_DGAIN_TARGET,
            max_isp_dgain_target: MAX_ISP_DGAIN_TARGET,

            fps: self.fps,
            min_fps: mode.min_fps,
            hist_thresh: HIST_THRESH,

            max_again: mode.again.max,
            min_again: mode.again.min,
            max_again_target: mode.again.max,
            min_again_target: mode.again.min,
            max_dgain: mode.dgain.max,
            min_dgain: mode.dgain.min,
            max_dgain_target: mode.dgain.max,
            min_dgain_target: mode.dgain.min,

            ae_compensation: AE_COMPENSATION,
            init_ae_speed: INIT_AE_SPEED,
            init_ae_tolerance: INIT_AE_TOLERANCE,
            ae_response_frame: AE_RESPONSE_FRAME,
            exp_mode: AeExpMode::HighlightPrior,
            init_exposure,

            max_int_time: self.max_int_time(),
            min_int_time: mode.exposure.min,
            max_int_time_target: MAX_INT_TIME_TARGET,
            min_int_time_target: MIN_INT_TIME_TARGET,
        }
    }

    /// Retime the frame for `fps` by stretching the frame length.
    ///
    /// Out-of-range rates are refused and leave the context as it was.
    /// On success the frame-length pair is queued and the updated AE bounds
    /// are returned.
    pub fn set_fps(&mut self, fps: f32, flicker_hz: u32) -> Result<AeDefaults> {
        let mode = self.descriptor();
        // Also rejects NaN.
        if !(fps >= mode.min_fps && fps <= mode.max_fps) {
            warn!(
                "fps {} outside [{}, {}] for {}",
                fps, mode.min_fps, mode.max_fps, mode.name
            );
            return Err(Unsupported::FrameRate {
                millis: (fps * 1000.0) as u32,
            }
            .into());
        }

        let ideal = (f64::from(mode.vts_def) * f64::from(mode.max_fps) / f64::from(fps)).round();
        let lines = (ideal as u32).clamp(mode.vts_def, regs::FRAME_LENGTH_MAX);

        // Queue first so a full batch leaves the frame length untouched.
        self.batch
            .enqueue_u16(regs::FRAME_LENGTH_H, regs::FRAME_LENGTH_L, lines as u16)?;
        self.apply_frame_length(lines);
        self.fps = fps;
        info!("fps {} -> frame length {} lines", fps, lines);
        Ok(self.ae_defaults(flicker_hz))
    }

    /// Queue an integration time, clamped to `[exposure.min, frame_length - 48]`.
    /// Returns the value that will be latched.
    pub fn update_integration_time(&mut self, lines: u32) -> Result<u32> {
        let min = self.descriptor().exposure.min;
        let applied = lines.min(self.max_int_time()).max(min);
        if applied != lines {
            debug!("integration time {} clamped to {}", lines, applied);
        }
        self.batch
            .enqueue_u16(regs::EXPOSURE_H, regs::EXPOSURE_L, applied as u16)?;
        Ok(applied)
    }

    /// Queue analog and digital gain codes, each clamped to the mode range.
    /// Returns the applied `(again, dgain)`.
    pub fn update_gains(&mut self, again: u32, dgain: u32) -> Result<(u32, u32)> {
        let mode = self.descriptor();
        let again = mode.again.clamp(again);
        let dgain = mode.dgain.clamp(dgain);

        self.batch.reserve(4)?;
        self.batch
            .enqueue_u16(regs::ANA_GAIN_H, regs::ANA_GAIN_L, again as u16)?;
        self.batch
            .enqueue_u16(regs::DGTL_GAIN_H, regs::DGTL_GAIN_L, dgain as u16)?;
        Ok((again, dgain))
    }

    /// Map a linear analog gain request to `(linear, register code)`.  The
    /// gain is programmed as a linear code, so both halves are the clamped
    /// request.
    pub fn again_calc_table(&self, requested: u32) -> (u32, u32) {
        let v = self.descriptor().again.clamp(requested);
        (v, v)
    }

    /// Digital-gain counterpart of [`again_calc_table`](Self::again_calc_table).
    pub fn dgain_calc_table(&self, requested: u32) -> (u32, u32) {
        let v = self.descriptor().dgain.clamp(requested);
        (v, v)
    }

    /// Per-exposure integration limits for multi-frame WDR.  In linear mode
    /// the outputs are left as the caller supplied them.
    pub fn get_inttime_max(&mut self, ratio: &[u32], _limits: &mut IntTimeLimits) -> Result<()> {
        if self.wdr == WdrMode::None {
            debug!("inttime max query in linear mode (ratios {:?})", ratio);
            return Ok(());
        }
        self.extra.max_time_get_count = self.extra.max_time_get_count.wrapping_add(1);
        warn!("inttime max requested for {:?}", self.wdr);
        Err(Unsupported::WdrMode.into())
    }

    /// Record the frame-synchronised WDR sub-mode.
    pub fn set_fswdr_attr(&mut self, mode: FswdrMode) {
        self.extra.fswdr_mode = mode;
        self.extra.max_time_get_count = 0;
        debug!("fswdr mode {:?}", mode);
    }
}
