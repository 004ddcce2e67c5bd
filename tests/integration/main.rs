//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one area of the driver
//! through its public capability traits, against either the recording
//! [`mock_bus::MockTransport`] or the byte-level sim bus.  All tests run on
//! the host with no real hardware.

mod ae_sync_tests;
mod lifecycle_tests;
mod mock_bus;
mod registry_tests;
