//! Value types that cross the capability-trait boundary.
//!
//! Everything here is plain data: the ISP framework passes requests in and
//! receives these structures back.  None of them hold references into a
//! sensor context.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of logical camera pipes the framework can drive.
pub const MAX_PIPES: usize = 6;

/// Register slots in one frame's sync batch.
pub const MAX_SYNC_REGS: usize = 32;

// ---------------------------------------------------------------------------
// Pipe
// ---------------------------------------------------------------------------

/// A validated pipe index (`0..MAX_PIPES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pipe(u8);

impl Pipe {
    pub fn new(index: usize) -> Result<Self> {
        if index < MAX_PIPES {
            Ok(Self(index as u8))
        } else {
            Err(Error::InvalidPipe(index))
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn id(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for Pipe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Register writes
// ---------------------------------------------------------------------------

/// One queued register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegWrite {
    pub addr: u16,
    pub value: u8,
}

impl RegWrite {
    pub const fn new(addr: u16, value: u8) -> Self {
        Self { addr, value }
    }
}

/// One frame's worth of register writes plus the bus coordinates the
/// pipeline needs to ship them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncInfo {
    pub bus: Option<u8>,
    pub i2c_addr: u8,
    pub addr_bytes: usize,
    pub data_bytes: usize,
    pub writes: heapless::Vec<RegWrite, MAX_SYNC_REGS>,
}

impl SyncInfo {
    /// True when there is something to write this frame.
    pub fn needs_update(&self) -> bool {
        !self.writes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mode selection
// ---------------------------------------------------------------------------

/// Wide dynamic range modes the framework can request.  Only `None`
/// (linear) is functional on this sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WdrMode {
    #[default]
    None,
    BuiltIn,
    TwoToOneLine,
    TwoToOneFrame,
}

/// Frame-synchronised WDR sub-mode recorded by the AE library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FswdrMode {
    #[default]
    Normal,
    LongFrame,
    AutoLongFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    RgbBayer8,
    #[default]
    RgbBayer10,
    RgbBayer12,
    RgbBayer16,
    Yuv422,
}

/// Readout orientation; the discriminant is the value of the
/// orientation register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 0b00,
    Mirror = 0b01,
    Flip = 0b10,
    MirrorFlip = 0b11,
}

impl Orientation {
    pub const fn register_value(self) -> u8 {
        self as u8
    }
}

/// Reply to a successful image-mode request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageModeInfo {
    pub fps: f32,
    pub max_width: u32,
    pub max_height: u32,
}

// ---------------------------------------------------------------------------
// AE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccuracyKind {
    #[default]
    Linear,
    Db,
    Table,
}

/// Step description the AE library uses to quantise a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accuracy {
    pub kind: AccuracyKind,
    pub step: f32,
    pub offset: f32,
}

impl Accuracy {
    pub const fn linear(step: f32) -> Self {
        Self {
            kind: AccuracyKind::Linear,
            step,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AeExpMode {
    #[default]
    HighlightPrior,
    LowlightPrior,
}

/// Everything the AE library needs to seed and bound its control loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AeDefaults {
    pub full_lines_std: u32,
    pub full_lines: u32,
    pub full_lines_max: u32,
    /// Flicker frequency in Hz, Q8 fixed point.
    pub flicker_freq: u32,
    pub hmax_times: u32,
    pub lines_per_500ms: u32,

    pub int_time_accu: Accuracy,
    pub again_accu: Accuracy,
    pub dgain_accu: Accuracy,

    pub isp_dgain_shift: u32,
    pub min_isp_dgain_target: u32,
    pub max_isp_dgain_target: u32,

    pub fps: f32,
    pub min_fps: f32,
    pub hist_thresh: [u8; 4],

    pub max_again: u32,
    pub min_again: u32,
    pub max_again_target: u32,
    pub min_again_target: u32,
    pub max_dgain: u32,
    pub min_dgain: u32,
    pub max_dgain_target: u32,
    pub min_dgain_target: u32,

    pub ae_compensation: u8,
    pub init_ae_speed: u32,
    pub init_ae_tolerance: u32,
    pub ae_response_frame: u32,
    pub exp_mode: AeExpMode,
    pub init_exposure: u32,

    pub max_int_time: u32,
    pub min_int_time: u32,
    pub max_int_time_target: u32,
    pub min_int_time_target: u32,
}

/// Per-exposure integration-time limits for multi-frame WDR.  Untouched in
/// linear mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntTimeLimits {
    pub max: [u32; 2],
    pub min: [u32; 2],
    pub long_frame_max: u32,
}

// ---------------------------------------------------------------------------
// AWB / ISP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwbDefaults {
    pub r_gain: u16,
    pub g_gain: u16,
    pub b_gain: u16,
    pub run_interval: u8,
}

/// Sensor-specific ISP tuning.  No noise profile is calibrated for this
/// sensor, so the ISP falls back to its own.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IspDefaults {
    pub noise_calibration: Option<[[f32; 3]; 16]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlackLevel {
    pub update: bool,
    pub offsets: [u16; 4],
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusStatus {
    #[default]
    Idle,
    Busy,
    Reached,
    Failed,
}
