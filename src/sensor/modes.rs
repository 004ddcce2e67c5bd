//! Static table of supported sensor modes.
//!
//! One row per resolution/fps class.  The table is immutable and shared by
//! every pipe; it is indexed by the closed [`ModeId`] enumeration so an
//! out-of-range lookup cannot be expressed.

use serde::{Deserialize, Serialize};

/// Full sensor array, used as the "max resolution" in mode replies.
pub const SENSOR_MAX_WIDTH: u32 = 4608;
pub const SENSOR_MAX_HEIGHT: u32 = 2592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModeId {
    /// 4608x2592 linear, 30 fps.
    #[default]
    Full4608x2592P30 = 0,
    /// 2304x1296 2x2 binned, 60 fps.
    Binned2304x1296P60 = 1,
}

impl ModeId {
    pub const COUNT: usize = 2;
    pub const ALL: [ModeId; Self::COUNT] = [Self::Full4608x2592P30, Self::Binned2304x1296P60];

    /// The descriptor row for this mode.
    pub fn descriptor(self) -> &'static ModeDescriptor {
        &MODE_TABLE[self as usize]
    }

    /// Exact-match a requested resolution against the table.
    pub fn from_resolution(width: u32, height: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.descriptor().width == width && m.descriptor().height == height)
    }
}

/// Inclusive numeric range with a default and a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u32,
    pub max: u32,
    pub def: u32,
    pub step: u32,
}

impl Range {
    pub const fn clamp(&self, value: u32) -> u32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// One immutable row of the mode table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeDescriptor {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub max_fps: f32,
    pub min_fps: f32,
    /// Default line length (HTS), pixel clocks.
    pub hts_def: u32,
    /// Default frame length (VTS), lines.
    pub vts_def: u32,
    /// Integration time, lines.
    pub exposure: Range,
    pub again: Range,
    pub dgain: Range,
}

pub static MODE_TABLE: [ModeDescriptor; ModeId::COUNT] = [
    ModeDescriptor {
        name: "4608x2592P30",
        width: 4608,
        height: 2592,
        max_fps: 30.0,
        min_fps: 1.0,
        hts_def: 15648,
        vts_def: 2649,
        exposure: Range { min: 1, max: 0xFFFF, def: 0x640, step: 1 },
        again: Range { min: 112, max: 960, def: 112, step: 1 },
        dgain: Range { min: 0x0100, max: 0xFFFF, def: 0x0100, step: 1 },
    },
    ModeDescriptor {
        name: "2304x1296P60_BINNED",
        width: 2304,
        height: 1296,
        max_fps: 60.0,
        min_fps: 1.0,
        hts_def: 7824,
        vts_def: 1336,
        exposure: Range { min: 1, max: 0xFFFF, def: 0x320, step: 1 },
        again: Range { min: 112, max: 960, def: 112, step: 1 },
        dgain: Range { min: 0x0100, max: 0xFFFF, def: 0x0100, step: 1 },
    },
];
