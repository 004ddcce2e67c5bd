//! Unified error types for the IMX708 control plane.
//!
//! A single `Error` enum that every subsystem converts into, so the ISP
//! framework sees one failure type per call.  All variants are `Copy` so they
//! can be returned through the capability traits without allocation.
//!
//! Saturation of exposure and gain requests is deliberately *not* an error:
//! those paths clamp and report the applied value instead.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The control bus failed (open, read, write or burst).
    Transport(TransportError),
    /// A request named a mode, format or rate the sensor does not support.
    /// The context is left unmodified.
    Unsupported(Unsupported),
    /// More register writes were queued between two drains than the sync
    /// batch can carry.  Indicates a logic defect in the caller.
    QueueOverflow { capacity: usize },
    /// The chip identity read during probe did not match.
    IdMismatch { expected: u16, found: u16 },
    /// Pipe index outside `0..MAX_PIPES`.
    InvalidPipe(usize),
    /// No sensor context is registered for this pipe.
    NotRegistered(u8),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Unsupported(e) => write!(f, "unsupported: {e}"),
            Self::QueueOverflow { capacity } => {
                write!(f, "register batch overflow (capacity {capacity})")
            }
            Self::IdMismatch { expected, found } => {
                write!(f, "chip id mismatch: expected 0x{expected:04X}, got 0x{found:04X}")
            }
            Self::InvalidPipe(idx) => write!(f, "pipe index {idx} out of range"),
            Self::NotRegistered(pipe) => write!(f, "pipe {pipe} not registered"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures of the register transport.  Never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The bus device for `bus` could not be opened.
    Open { bus: u8 },
    /// No bus number is configured for the pipe.
    NoBus,
    /// The pipe's bus handle is not open.
    NotOpen,
    /// Register read failed.
    Read { addr: u16, kind: ErrorKind },
    /// Register write failed.
    Write { addr: u16, kind: ErrorKind },
    /// A burst stopped at entry `index`; entries before it were written.
    Burst { index: usize, addr: u16, kind: ErrorKind },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { bus } => write!(f, "open /dev/i2c-{bus} failed"),
            Self::NoBus => write!(f, "no bus configured"),
            Self::NotOpen => write!(f, "bus not open"),
            Self::Read { addr, kind } => write!(f, "read 0x{addr:04X} failed: {kind}"),
            Self::Write { addr, kind } => write!(f, "write 0x{addr:04X} failed: {kind}"),
            Self::Burst { index, addr, kind } => {
                write!(f, "burst stopped at entry {index} (0x{addr:04X}): {kind}")
            }
        }
    }
}

impl core::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration-range rejections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    Resolution { width: u32, height: u32 },
    WdrMode,
    PixelFormat,
    /// Frame rate in milli-fps, outside the active mode's bounds.
    FrameRate { millis: u32 },
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution { width, height } => write!(f, "resolution {width}x{height}"),
            Self::WdrMode => write!(f, "WDR mode"),
            Self::PixelFormat => write!(f, "pixel format"),
            Self::FrameRate { millis } => {
                write!(f, "frame rate {}.{:03} fps", millis / 1000, millis % 1000)
            }
        }
    }
}

impl core::error::Error for Unsupported {}

impl From<Unsupported> for Error {
    fn from(e: Unsupported) -> Self {
        Self::Unsupported(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
