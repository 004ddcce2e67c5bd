//! IMX708 sensor logic: static mode table, per-pipe context, register batch
//! and the AE / AWB / lifecycle operations on that context.

pub mod ae;
pub mod awb;
pub mod batch;
pub mod context;
pub mod lifecycle;
pub mod modes;

pub use batch::RegisterBatch;
pub use context::{DriverState, LifecycleState, SensorContext};
pub use modes::{MODE_TABLE, ModeDescriptor, ModeId};
