//! Per-frame register batch.
//!
//! AE and orientation changes computed during one frame must not reach the
//! sensor until its register-latch boundary (next frame start).  They are
//! queued here and the external pipeline drains the queue exactly once per
//! vertical sync.
//!
//! ```text
//!  set_fps / inttime / gains / mirror ──▶ enqueue ──▶ [RegWrite; 32]
//!                                                        │
//!                         pipeline (once per vsync) ◀── drain
//! ```
//!
//! The queue is owned by its sensor context: one producer (the AE calls) and
//! one consumer (the drain), never aliased.

use log::error;

use crate::error::{Error, Result};
use crate::regs;
use crate::types::{MAX_SYNC_REGS, RegWrite};

pub type Writes = heapless::Vec<RegWrite, MAX_SYNC_REGS>;

#[derive(Debug, Default)]
pub struct RegisterBatch {
    writes: Writes,
    /// Latched when an enqueue was refused; reported by the next
    /// [`take_checked`](Self::take_checked).
    overflowed: bool,
}

impl RegisterBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity() -> usize {
        MAX_SYNC_REGS
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Free slots before the next drain.
    pub fn remaining(&self) -> usize {
        self.writes.capacity() - self.writes.len()
    }

    /// Pending writes in queue order.
    pub fn pending(&self) -> &[RegWrite] {
        &self.writes
    }

    /// Append one write.
    pub fn enqueue(&mut self, addr: u16, value: u8) -> Result<()> {
        if self.writes.push(RegWrite::new(addr, value)).is_err() {
            return Err(self.overflow());
        }
        Ok(())
    }

    /// Fail unless `n` more writes fit.  Used to keep multi-register
    /// updates all-or-nothing.
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(self.overflow());
        }
        Ok(())
    }

    /// Append a 16-bit value as two writes, high byte first.  Both or
    /// neither are queued.
    pub fn enqueue_u16(&mut self, addr_h: u16, addr_l: u16, value: u16) -> Result<()> {
        self.reserve(2)?;
        let (hi, lo) = regs::split_u16(value);
        self.enqueue(addr_h, hi)?;
        self.enqueue(addr_l, lo)
    }

    /// Return every pending write and leave the queue empty.  An empty
    /// result is the normal steady state.
    pub fn drain(&mut self) -> Writes {
        core::mem::take(&mut self.writes)
    }

    /// Drain, but refuse if an enqueue was dropped since the last drain.
    /// The queue and the overflow latch are cleared either way.
    pub fn take_checked(&mut self) -> Result<Writes> {
        let writes = self.drain();
        if core::mem::take(&mut self.overflowed) {
            return Err(Error::QueueOverflow {
                capacity: MAX_SYNC_REGS,
            });
        }
        Ok(writes)
    }

    /// Drop everything, including the overflow latch.
    pub fn clear(&mut self) {
        self.writes.clear();
        self.overflowed = false;
    }

    fn overflow(&mut self) -> Error {
        self.overflowed = true;
        error!(
            "register batch full ({} slots); too many writes queued between drains",
            MAX_SYNC_REGS
        );
        Error::QueueOverflow {
            capacity: MAX_SYNC_REGS,
        }
    }
}
