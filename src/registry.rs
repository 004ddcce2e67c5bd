//! Per-pipe context slots.
//!
//! Each pipe owns at most one boxed [`SensorContext`].  Replacing or removing
//! a slot drops the old context (and its driver-state block) on the spot;
//! the counters below let callers check that registration churn does not
//! leak.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::sensor::SensorContext;
use crate::types::{MAX_PIPES, Pipe};

/// Context allocation bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocStats {
    pub allocated: usize,
    pub freed: usize,
}

impl AllocStats {
    /// Contexts currently held.
    pub fn live(&self) -> usize {
        self.allocated - self.freed
    }
}

#[derive(Debug)]
pub struct Registry {
    slots: [Option<Box<SensorContext>>; MAX_PIPES],
    stats: AllocStats,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            stats: AllocStats::default(),
        }
    }

    /// Store `ctx` for `pipe`, dropping any context already there.
    pub fn insert(&mut self, pipe: Pipe, ctx: Box<SensorContext>) {
        self.stats.allocated += 1;
        if self.slots[pipe.index()].replace(ctx).is_some() {
            warn!("pipe {}: re-registered, previous context released", pipe);
            self.stats.freed += 1;
        }
    }

    /// Drop the context for `pipe`.  Returns `false` if there was none.
    pub fn remove(&mut self, pipe: Pipe) -> bool {
        match self.slots[pipe.index()].take() {
            Some(ctx) => {
                debug!("pipe {}: releasing context ({:?})", pipe, ctx.state());
                drop(ctx);
                self.stats.freed += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, pipe: Pipe) -> Result<&SensorContext> {
        self.slots[pipe.index()]
            .as_deref()
            .ok_or(Error::NotRegistered(pipe.id()))
    }

    pub fn get_mut(&mut self, pipe: Pipe) -> Result<&mut SensorContext> {
        self.slots[pipe.index()]
            .as_deref_mut()
            .ok_or(Error::NotRegistered(pipe.id()))
    }

    pub fn is_registered(&self, pipe: Pipe) -> bool {
        self.slots[pipe.index()].is_some()
    }

    pub fn stats(&self) -> AllocStats {
        self.stats
    }

    /// Pipes that currently hold a context, in index order.
    pub fn pipes(&self) -> impl Iterator<Item = Pipe> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .filter_map(|(i, _)| Pipe::new(i).ok())
    }
}
