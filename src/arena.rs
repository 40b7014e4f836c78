//! Allocation budget for the build phase.
//!
//! Containers in this crate own their buffers outright; the arena tracks how
//! many bytes a build is allowed to consume, so exhaustion surfaces as a
//! normal [`BuildError::AllocationFailure`] instead of an OOM abort. A charge
//! either succeeds immediately or fails immediately; there is no retry.
//!
//! Builds typically use two arenas: one whose budget covers the finished
//! tables, and a temporary one for collection-phase scratch that is dropped
//! as a whole once construction completes.

use std::cell::Cell;

use crate::error::{BuildError, Result};

/// Byte-budget handle passed into every container and builder constructor.
///
/// Not `Sync` by construction (`Cell` counters): an arena belongs to exactly
/// one building context at a time.
#[derive(Debug)]
pub struct Arena {
    limit: Option<usize>,
    used: Cell<usize>,
}

impl Arena {
    /// Create an arena with a hard byte limit.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            used: Cell::new(0),
        }
    }

    /// Create an arena that never refuses a charge.
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            used: Cell::new(0),
        }
    }

    /// Reserve `bytes` against the budget.
    pub fn charge(&self, bytes: usize) -> Result<()> {
        let used = self.used.get();
        if let Some(limit) = self.limit {
            if used.saturating_add(bytes) > limit {
                return Err(BuildError::AllocationFailure {
                    requested: bytes,
                    used,
                    limit,
                });
            }
        }
        self.used.set(used.saturating_add(bytes));
        Ok(())
    }

    /// Return `bytes` to the budget.
    ///
    /// Callers that drop a container without refunding simply leave the
    /// charge in place until the arena itself goes away; that is valid, just
    /// less precise.
    pub fn refund(&self, bytes: usize) {
        self.used.set(self.used.get().saturating_sub(bytes));
    }

    /// Bytes charged so far.
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Bytes left before charges start failing, or `None` if unbounded.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used.get()))
    }
}
