//! Per-pipe mutable sensor state.
//!
//! `SensorContext` is the single struct the AE, AWB and lifecycle code reads
//! from and writes to.  One instance exists per registered pipe; it is owned
//! by the [`Registry`](crate::registry::Registry) and dropped on
//! unregistration.

use log::{info, warn};

use crate::error::{Result, Unsupported};
use crate::regs;
use crate::types::{FswdrMode, Orientation, PixelFormat, WdrMode};

use super::batch::{RegisterBatch, Writes};
use super::modes::{ModeDescriptor, ModeId};

// ---------------------------------------------------------------------------
// Lifecycle state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    /// Identity verified, bus left open.
    Probed,
    /// Mode register burst written.
    Initialized,
    Streaming,
    Standby,
    /// Bus closed by `exit`.
    Exited,
}

// ---------------------------------------------------------------------------
// Driver-private scratch
// ---------------------------------------------------------------------------

/// Driver-private state that survives mode switches.  Allocated alongside
/// the context and freed before it.
#[derive(Debug, Clone, Default)]
pub struct DriverState {
    /// Last commanded absolute focus position.
    pub focus_pos: i32,
    /// Non-zero overrides the mode's default initial exposure.
    pub init_exposure: u32,
    /// Non-zero overrides the computed lines-per-500ms.
    pub lines_per_500ms: u32,
    pub fswdr_mode: FswdrMode,
    pub max_time_get_count: u32,
    pub orientation: Orientation,
}

// ---------------------------------------------------------------------------
// SensorContext
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SensorContext {
    pub(crate) mode: ModeId,
    pub(crate) wdr: WdrMode,
    pub(crate) pixel_format: PixelFormat,
    /// Current effective frame length (VTS), lines.
    pub(crate) frame_length: u32,
    /// Applied frame length for this frame `[0]` and the previous one `[1]`.
    pub(crate) frame_length_history: [u32; 2],
    /// Frame rate the current frame length was set for.
    pub(crate) fps: f32,
    pub(crate) state: LifecycleState,
    pub(crate) initialized: bool,
    pub(crate) batch: RegisterBatch,
    pub(crate) extra: Box<DriverState>,
}

impl SensorContext {
    /// A context in its global-init state for `mode`.
    pub fn new(mode: ModeId) -> Self {
        Self::with_state(mode, Box::default())
    }

    pub(crate) fn with_state(mode: ModeId, extra: Box<DriverState>) -> Self {
        let desc = mode.descriptor();
        Self {
            mode,
            wdr: WdrMode::None,
            pixel_format: PixelFormat::default(),
            frame_length: desc.vts_def,
            frame_length_history: [desc.vts_def; 2],
            fps: desc.max_fps,
            state: LifecycleState::Uninitialized,
            initialized: false,
            batch: RegisterBatch::new(),
            extra,
        }
    }

    /// Reset to defaults for `mode`, keeping the driver scratch block.
    pub fn global_init(&mut self, mode: ModeId) {
        self.initialized = false;
        self.state = LifecycleState::Uninitialized;
        self.wdr = WdrMode::None;
        self.load_mode(mode);
        self.batch.clear();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> ModeId {
        self.mode
    }

    pub fn descriptor(&self) -> &'static ModeDescriptor {
        self.mode.descriptor()
    }

    pub fn wdr_mode(&self) -> WdrMode {
        self.wdr
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn frame_length(&self) -> u32 {
        self.frame_length
    }

    pub fn frame_length_history(&self) -> [u32; 2] {
        self.frame_length_history
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn batch(&self) -> &RegisterBatch {
        &self.batch
    }

    pub fn driver_state(&self) -> &DriverState {
        &self.extra
    }

    pub fn driver_state_mut(&mut self) -> &mut DriverState {
        &mut self.extra
    }

    /// Longest integration time the current frame length allows.
    pub fn max_int_time(&self) -> u32 {
        self.frame_length.saturating_sub(regs::EXPOSURE_OFFSET)
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Select `mode` and reset frame timing to its defaults.
    pub(crate) fn load_mode(&mut self, mode: ModeId) {
        self.mode = mode;
        let desc = mode.descriptor();
        self.frame_length = desc.vts_def;
        self.frame_length_history = [desc.vts_def; 2];
        self.fps = desc.max_fps;
    }

    /// Record a newly applied frame length.
    pub(crate) fn apply_frame_length(&mut self, lines: u32) {
        self.frame_length = lines;
        self.frame_length_history = [lines, self.frame_length_history[0]];
    }

    pub(crate) fn transition(&mut self, pipe: u8, next: LifecycleState) {
        if self.state != next {
            info!("pipe {}: {:?} -> {:?}", pipe, self.state, next);
        }
        self.state = next;
    }

    /// Accept only linear mode.  Clears the initial-exposure override so the
    /// next AE cycle starts from the mode default.
    pub fn set_wdr_mode(&mut self, mode: WdrMode) -> Result<()> {
        if mode != WdrMode::None {
            warn!("unsupported WDR mode {:?}", mode);
            return Err(Unsupported::WdrMode.into());
        }
        self.wdr = mode;
        self.extra.init_exposure = 0;
        info!("linear mode selected");
        Ok(())
    }

    /// Queue an orientation change for the next frame boundary.
    pub fn set_mirror_flip(&mut self, orientation: Orientation) -> Result<()> {
        self.batch
            .enqueue(regs::ORIENTATION, orientation.register_value())?;
        self.extra.orientation = orientation;
        Ok(())
    }

    /// Only RAW10 Bayer is produced by this sensor's MIPI configuration.
    pub fn set_pixel_format(&mut self, format: PixelFormat) -> Result<()> {
        if format != PixelFormat::RgbBayer10 {
            warn!("unsupported pixel format {:?}", format);
            return Err(Unsupported::PixelFormat.into());
        }
        self.pixel_format = format;
        Ok(())
    }

    /// Hand this frame's writes to the pipeline and reset the queue.
    pub fn drain_sync(&mut self) -> Result<Writes> {
        self.batch.take_checked()
    }
}
