//! Operation queue for one item.
//!
//! At most one operation per item talks to the remote store at a time.
//! Further requests wait in FIFO order and are released one by one as the
//! in-flight operation settles:
//! 1. `submit()` - start now if the slot is free, otherwise wait
//! 2. `finish()` - free the slot and hand back the next waiting operation

use std::collections::VecDeque;

use crate::status::{OpId, OpKind};

/// An operation waiting for, or holding, the in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedOp {
    /// Identity of the operation.
    pub op: OpId,
    /// What the operation does.
    pub kind: OpKind,
}

impl QueuedOp {
    /// Create a new queued operation.
    pub fn new(op: OpId, kind: OpKind) -> Self {
        Self { op, kind }
    }
}

/// Single in-flight slot plus a FIFO of waiting operations.
#[derive(Debug, Clone, Default)]
pub struct OpQueue {
    in_flight: Option<QueuedOp>,
    waiting: VecDeque<QueuedOp>,
}

impl OpQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit an operation.
    ///
    /// Returns the operation if it took the free slot and should be launched
    /// now; returns `None` if it was queued behind the in-flight one.
    pub fn submit(&mut self, queued: QueuedOp) -> Option<QueuedOp> {
        if self.in_flight.is_some() {
            self.waiting.push_back(queued);
            return None;
        }
        self.in_flight = Some(queued);
        Some(queued)
    }

    /// Record that `op` has settled.
    ///
    /// Returns the next operation to launch, which now holds the slot.
    /// Settling an operation that does not hold the slot changes nothing.
    pub fn finish(&mut self, op: OpId) -> Option<QueuedOp> {
        match self.in_flight {
            Some(current) if current.op == op => {}
            _ => return None,
        }
        self.in_flight = self.waiting.pop_front();
        self.in_flight
    }

    /// The operation holding the slot.
    pub fn in_flight(&self) -> Option<QueuedOp> {
        self.in_flight
    }

    /// Number of operations waiting behind the in-flight one.
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Check if nothing is in flight or waiting.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.waiting.is_empty()
    }
}
