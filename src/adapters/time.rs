//! Blocking delay for host builds.
//!
//! Implements `embedded_hal::delay::DelayNs` on top of
//! `std::thread::sleep`, for the restart settle wait.  Tests that must not
//! sleep use [`RecordingDelay`] instead.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Thread-sleeping delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Accumulates requested delays without sleeping.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    total_ns: u64,
    calls: usize,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
        self.calls += 1;
    }
}
