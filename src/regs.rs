//! IMX708 register map and bus constants.
//!
//! Every module references this file rather than hard-coding register
//! addresses.  Two-register values are split high byte first: the `_H`
//! address carries bits 15..8, the `_L` address bits 7..0.

// ---------------------------------------------------------------------------
// Control bus
// ---------------------------------------------------------------------------

/// 7-bit I2C device address.
pub const I2C_ADDR: u8 = 0x1A;
/// Register addresses are 16 bits, sent big-endian.
pub const ADDR_BYTES: usize = 2;
/// Register data is one byte.
pub const DATA_BYTES: usize = 1;

/// Default `/dev/i2c-N` bus for the camera connector.
pub const DEFAULT_BUS: u8 = 4;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Chip identity, high byte at `CHIP_ID_H`, low byte at `CHIP_ID_L`.
pub const CHIP_ID: u16 = 0x0708;
pub const CHIP_ID_H: u16 = 0x0016;
pub const CHIP_ID_L: u16 = 0x0017;

// ---------------------------------------------------------------------------
// Streaming and orientation
// ---------------------------------------------------------------------------

pub const MODE_SELECT: u16 = 0x0100;
pub const MODE_STANDBY: u8 = 0x00;
pub const MODE_STREAMING: u8 = 0x01;

/// Bit 0 = horizontal mirror, bit 1 = vertical flip.
pub const ORIENTATION: u16 = 0x0101;

// ---------------------------------------------------------------------------
// Exposure and gain
// ---------------------------------------------------------------------------

/// Coarse integration time, in lines.
pub const EXPOSURE_H: u16 = 0x0202;
pub const EXPOSURE_L: u16 = 0x0203;

/// Analog gain code.  Byte order is defined by effect (high first); confirm
/// against the datasheet before hardware bring-up.
pub const ANA_GAIN_H: u16 = 0x0204;
pub const ANA_GAIN_L: u16 = 0x0205;

/// Digital gain, 0x0100 = 1x.
pub const DGTL_GAIN_H: u16 = 0x020E;
pub const DGTL_GAIN_L: u16 = 0x020F;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

/// Frame length (VTS), in lines.
pub const FRAME_LENGTH_H: u16 = 0x0340;
pub const FRAME_LENGTH_L: u16 = 0x0341;

/// Line length (HTS), in pixel clocks.
pub const LINE_LENGTH_H: u16 = 0x0342;
pub const LINE_LENGTH_L: u16 = 0x0343;

/// Largest representable frame length.
pub const FRAME_LENGTH_MAX: u32 = 0xFFFF;

/// Lines of readout overhead: integration time must stay at least this far
/// below the frame length.
pub const EXPOSURE_OFFSET: u32 = 48;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Settle time after switching to streaming.
pub const RESTART_SETTLE_MS: u32 = 20;

/// Split a 16-bit register value into `(high, low)` bytes.
pub const fn split_u16(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xFF) as u8)
}
