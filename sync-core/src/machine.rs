//! Status machine for one synced item.
//!
//! This module provides a pure, side-effect-free state machine that decides
//! which requests may start, which must wait, which are refused, and what a
//! completed operation means for the item's status. It takes events as input
//! and produces a new machine plus a list of actions to execute.
//!
//! The actual I/O (reading files, saving records) is performed by
//! sync-client, not by this module.
//!
//! Supersession: every issued operation gets a fresh [`OpId`] and the status
//! records the most recent one. When an operation settles, its id is compared
//! with the one in the status. A mismatch means a newer request took over;
//! the settlement is then absorbed without touching the status.

use crate::queue::{OpQueue, QueuedOp};
use crate::status::{OpId, OpKind, StatusKind, SyncStatus};

/// A caller request against an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Publish local bytes; refused while in error.
    Upload,
    /// Pull the remote record over local bytes; only from error.
    Download,
    /// Force local bytes over the remote record; only from error.
    Replace,
    /// Delete the remote record; refused while networking.
    Delete,
}

impl Request {
    /// The operation kind a request issues, `None` for delete.
    pub fn op_kind(&self) -> Option<OpKind> {
        match self {
            Request::Upload => Some(OpKind::Upload),
            Request::Download => Some(OpKind::Download),
            Request::Replace => Some(OpKind::Replace),
            Request::Delete => None,
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.op_kind() {
            Some(kind) => write!(f, "{}", kind),
            None => f.write_str("delete"),
        }
    }
}

/// Events that drive the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A caller asked for an operation.
    Requested(Request),
    /// An in-flight operation finished.
    Settled {
        /// Which operation finished.
        op: OpId,
        /// Its outcome; the error string becomes the status cause.
        result: Result<(), String>,
    },
}

/// How a settled operation is reported to its observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The operation was current and succeeded; status is now synced.
    Completed,
    /// The operation was current and failed; status is now error.
    Failed {
        /// Description of the failure.
        cause: String,
    },
    /// A newer request took over before this one settled.
    Superseded,
}

/// Actions to be executed by the sync-client.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A request produced an operation; the caller gets an observer for it.
    Issued {
        /// The new operation.
        op: OpId,
        /// What it does.
        kind: OpKind,
        /// Whether it waits behind an in-flight operation.
        chained: bool,
    },
    /// Start the work of an operation now.
    Launch {
        /// Operation to start.
        op: OpId,
        /// What it does.
        kind: OpKind,
    },
    /// The request was refused; nothing was started.
    Refuse {
        /// The refused request.
        request: Request,
        /// Status that caused the refusal.
        status: StatusKind,
    },
    /// Issue a remote delete outside of the status machine.
    DeleteRemote,
    /// Report a settled operation to its observers.
    Resolve {
        /// The settled operation.
        op: OpId,
        /// What observers see.
        settlement: Settlement,
    },
    /// The status changed.
    EmitStatus(SyncStatus),
}

/// Status machine for one item - NO I/O, just state transitions.
#[derive(Debug, Clone)]
pub struct StatusMachine {
    status: SyncStatus,
    last_op: OpId,
    queue: OpQueue,
}

impl StatusMachine {
    /// Create a machine in the Synced state.
    pub fn new() -> Self {
        Self::with_status(SyncStatus::Synced)
    }

    /// Create a machine starting from a derived status.
    ///
    /// A `Networking` status has no operation behind it in a new machine and
    /// is treated as `Synced`.
    pub fn with_status(status: SyncStatus) -> Self {
        let status = match status {
            SyncStatus::Networking { .. } => SyncStatus::Synced,
            other => other,
        };
        Self {
            status,
            last_op: OpId::new(0),
            queue: OpQueue::new(),
        }
    }

    /// Current status.
    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// The operation queue.
    pub fn queue(&self) -> &OpQueue {
        &self.queue
    }

    /// Check if no operation is in flight or waiting.
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    /// Process an event and return the new machine plus actions to execute.
    ///
    /// This is a pure function - no side effects.
    pub fn on_event(mut self, event: Event) -> (Self, Vec<Action>) {
        let actions = match event {
            Event::Requested(request) => self.on_request(request),
            Event::Settled { op, result } => self.on_settled(op, result),
        };
        (self, actions)
    }

    fn on_request(&mut self, request: Request) -> Vec<Action> {
        let allowed = match (request, &self.status) {
            (Request::Upload, SyncStatus::Error { .. }) => false,
            (Request::Upload, _) => true,
            (Request::Download | Request::Replace, SyncStatus::Error { .. }) => true,
            (Request::Download | Request::Replace, _) => false,
            (Request::Delete, SyncStatus::Networking { .. }) => false,
            (Request::Delete, _) => true,
        };
        if !allowed {
            return vec![Action::Refuse {
                request,
                status: self.status.kind(),
            }];
        }

        let Some(kind) = request.op_kind() else {
            return vec![Action::DeleteRemote];
        };

        let op = self.mint();
        let launch = self.queue.submit(QueuedOp::new(op, kind));
        self.status = SyncStatus::Networking { op };

        let mut actions = vec![Action::Issued {
            op,
            kind,
            chained: launch.is_none(),
        }];
        if let Some(next) = launch {
            actions.push(Action::Launch {
                op: next.op,
                kind: next.kind,
            });
        }
        actions.push(Action::EmitStatus(self.status.clone()));
        actions
    }

    fn on_settled(&mut self, op: OpId, result: Result<(), String>) -> Vec<Action> {
        // The next link runs whatever this one's outcome was.
        let next = self.queue.finish(op);

        let mut actions = Vec::with_capacity(3);
        if self.status.current_op() == Some(op) {
            let settlement = match result {
                Ok(()) => {
                    self.status = SyncStatus::Synced;
                    Settlement::Completed
                }
                Err(cause) => {
                    self.status = SyncStatus::Error {
                        cause: cause.clone(),
                    };
                    Settlement::Failed { cause }
                }
            };
            // Observers wake after the status they will read is out.
            actions.push(Action::EmitStatus(self.status.clone()));
            actions.push(Action::Resolve { op, settlement });
        } else {
            actions.push(Action::Resolve {
                op,
                settlement: Settlement::Superseded,
            });
        }

        if let Some(next) = next {
            actions.push(Action::Launch {
                op: next.op,
                kind: next.kind,
            });
        }
        actions
    }

    fn mint(&mut self) -> OpId {
        self.last_op = self.last_op.next();
        self.last_op
    }
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}
