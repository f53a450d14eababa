//! Item actor.
//!
//! An item mirrors one remote record in one local file. Each item runs as a
//! task that owns its [`StatusMachine`] and record snapshot; callers talk to
//! it through a cloneable [`ItemHandle`].
//!
//! ```text
//! ItemHandle ──Command──> actor ──Launch──> job task ──save/fetch──> RecordStore
//!                           ^                   |
//!                           └──── Settled ──────┘
//! ```
//!
//! Status only ever changes inside the actor, so there is no lock around it.
//! Jobs run concurrently with the actor and report back through a channel;
//! the machine decides whether each report is still authoritative.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use itemsync_content::{Blake3Hasher, ContentHasher, LocalStore};
use itemsync_core::{Action, Event, OpId, OpKind, Request, Settlement, StatusMachine, SyncStatus};
use itemsync_types::{Digest, Record, RecordId, SavePolicy};
use tokio::sync::{mpsc, oneshot, watch};

use crate::config::ItemConfig;
use crate::error::ItemError;
use crate::store::RecordStore;

/// The collaborators an item works against.
#[derive(Clone)]
pub struct Backends {
    /// Remote record store.
    pub remote: Arc<dyn RecordStore>,
    /// Local byte storage.
    pub local: Arc<dyn LocalStore>,
    /// Checksum function for payloads.
    pub hasher: Arc<dyn ContentHasher>,
}

impl Backends {
    /// Bundle a remote and a local store, hashing with BLAKE3.
    pub fn new(remote: Arc<dyn RecordStore>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            remote,
            local,
            hasher: Arc::new(Blake3Hasher),
        }
    }

    /// Use a different checksum function.
    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("hasher", &self.hasher.algorithm())
            .finish_non_exhaustive()
    }
}

/// How an observed operation ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflected {
    /// The operation was the latest one and succeeded; the item is synced.
    Completed,
    /// A newer request took over; this outcome no longer matters.
    Superseded,
}

impl Reflected {
    /// Check if the operation completed as the latest one.
    pub fn is_completed(&self) -> bool {
        matches!(self, Reflected::Completed)
    }
}

type Outcome = Result<Reflected, ItemError>;

/// Future for the outcome of one issued operation.
///
/// Resolves when the operation settles:
/// - `Ok(Completed)` if it was still the latest and succeeded
/// - `Err(_)` if it was still the latest and failed
/// - `Ok(Superseded)` if a newer request took over first
#[derive(Debug)]
#[must_use = "a reflection does nothing unless awaited"]
pub struct Reflection {
    op: OpId,
    rx: oneshot::Receiver<Outcome>,
}

impl Reflection {
    /// The observed operation.
    pub fn op(&self) -> OpId {
        self.op
    }
}

impl Future for Reflection {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(ItemError::Closed)))
    }
}

/// Future for a remote delete.
#[derive(Debug)]
#[must_use = "a deletion does nothing unless awaited"]
pub struct Deletion {
    rx: oneshot::Receiver<Result<(), ItemError>>,
}

impl Future for Deletion {
    type Output = Result<(), ItemError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(ItemError::Closed)))
    }
}

/// What the actor hands back for an accepted request.
#[derive(Debug)]
enum Ticket {
    Reflection(Reflection),
    Deletion(Deletion),
}

#[derive(Debug)]
enum Command {
    Request {
        request: Request,
        reply: oneshot::Sender<Option<Ticket>>,
    },
    Reflect {
        reply: oneshot::Sender<Result<Reflection, ItemError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Record>,
    },
}

/// A finished job, posted back to the actor.
#[derive(Debug)]
struct Settled {
    op: OpId,
    // Record returned by the store, if the job got that far.
    record: Option<Record>,
    result: Result<(), ItemError>,
}

/// An item before its actor is started.
#[derive(Debug, Clone)]
pub struct Item {
    record: Record,
    path: PathBuf,
    status: SyncStatus,
}

impl Item {
    /// Create an item for `record` cached at `path`, starting synced.
    pub fn new(record: Record, path: impl Into<PathBuf>) -> Self {
        Self {
            record,
            path: path.into(),
            status: SyncStatus::Synced,
        }
    }

    /// Start from the given status instead.
    pub fn with_status(mut self, status: SyncStatus) -> Self {
        self.status = status;
        self
    }

    /// Derive the starting status from the local bytes, the record checksum
    /// and `base`, the checksum recorded at the last successful sync.
    pub async fn derive_status(mut self, backends: &Backends, base: Option<Digest>) -> Self {
        self.status = match backends.local.read(&self.path).await {
            Ok(bytes) => {
                let local = backends.hasher.digest(&bytes);
                SyncStatus::derive(Some(&local), base.as_ref(), self.record.checksum.as_ref())
            }
            Err(e) if e.is_not_found() => {
                SyncStatus::derive(None, base.as_ref(), self.record.checksum.as_ref())
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", self.path.display(), e);
                SyncStatus::Error {
                    cause: format!("local copy unreadable: {}", e),
                }
            }
        };
        tracing::debug!("Item {} starts {}", self.record.id, self.status);
        self
    }

    /// Current starting status.
    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Start the actor and return its handle.
    ///
    /// Must be called within a tokio runtime. The actor stops once every
    /// handle is dropped and no operation is left in flight.
    pub fn spawn(self, backends: Backends, config: &ItemConfig) -> ItemHandle {
        let (command_tx, command_rx) = mpsc::channel(config.mailbox_capacity.max(1));
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let machine = StatusMachine::with_status(self.status);
        let (status_tx, status_rx) = watch::channel(machine.status().clone());

        let handle = ItemHandle {
            id: self.record.id,
            path: self.path.clone(),
            commands: command_tx,
            status: status_rx,
        };

        let actor = ItemActor {
            machine,
            snapshot: self.record,
            path: self.path,
            backends,
            observers: HashMap::new(),
            status_tx,
            commands: command_rx,
            settled_tx,
            settled_rx,
        };
        tokio::spawn(actor.run());

        handle
    }
}

/// Cloneable address of a running item.
#[derive(Debug, Clone)]
pub struct ItemHandle {
    id: RecordId,
    path: PathBuf,
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<SyncStatus>,
}

impl ItemHandle {
    /// Identity of the mirrored record.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Location of the local bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Publish the local bytes.
    ///
    /// Refused (returns `None`) while the item is in error. While another
    /// operation is in flight the upload is queued behind it.
    pub async fn upload(&self) -> Result<Option<Reflection>, ItemError> {
        self.operate(Request::Upload).await
    }

    /// Overwrite the local bytes with the remote record's payload.
    ///
    /// Only accepted while the item is in error.
    pub async fn download(&self) -> Result<Option<Reflection>, ItemError> {
        self.operate(Request::Download).await
    }

    /// Overwrite the remote record with the local bytes, ignoring its change tag.
    ///
    /// Only accepted while the item is in error.
    pub async fn replace(&self) -> Result<Option<Reflection>, ItemError> {
        self.operate(Request::Replace).await
    }

    /// Delete the remote record.
    ///
    /// Refused (returns `None`) while an operation is in flight. The status
    /// is left as it is.
    pub async fn delete(&self) -> Result<Option<Deletion>, ItemError> {
        match self.request(Request::Delete).await? {
            Some(Ticket::Deletion(deletion)) => Ok(Some(deletion)),
            _ => Ok(None),
        }
    }

    /// Observe the latest issued operation.
    ///
    /// Fails with [`ItemError::WrongState`] when nothing is in flight.
    pub async fn reflect(&self) -> Result<Reflection, ItemError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reflect { reply }).await?;
        rx.await.map_err(|_| ItemError::Closed)?
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Current record snapshot.
    pub async fn snapshot(&self) -> Result<Record, ItemError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| ItemError::Closed)
    }

    async fn operate(&self, request: Request) -> Result<Option<Reflection>, ItemError> {
        match self.request(request).await? {
            Some(Ticket::Reflection(reflection)) => Ok(Some(reflection)),
            _ => Ok(None),
        }
    }

    async fn request(&self, request: Request) -> Result<Option<Ticket>, ItemError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Request { request, reply }).await?;
        rx.await.map_err(|_| ItemError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), ItemError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ItemError::Closed)
    }
}

struct ItemActor {
    machine: StatusMachine,
    snapshot: Record,
    path: PathBuf,
    backends: Backends,
    observers: HashMap<OpId, Vec<oneshot::Sender<Outcome>>>,
    status_tx: watch::Sender<SyncStatus>,
    commands: mpsc::Receiver<Command>,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
}

impl ItemActor {
    async fn run(mut self) {
        let mut handles_gone = false;

        loop {
            if handles_gone && self.machine.is_idle() {
                break;
            }

            tokio::select! {
                Some(settled) = self.settled_rx.recv() => self.on_settled(settled),
                command = self.commands.recv(), if !handles_gone => match command {
                    Some(command) => self.on_command(command),
                    None => handles_gone = true,
                },
                else => break,
            }
        }

        tracing::debug!("Item {} stopped", self.snapshot.id);
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Request { request, reply } => {
                let actions = self.step(Event::Requested(request));
                let ticket = self.perform(actions, None);
                let _ = reply.send(ticket);
            }
            Command::Reflect { reply } => {
                let _ = reply.send(self.reflect());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot.clone());
            }
        }
    }

    fn reflect(&mut self) -> Result<Reflection, ItemError> {
        match self.machine.status().current_op() {
            Some(op) => Ok(self.observe(op)),
            None => Err(ItemError::WrongState {
                status: self.machine.status().kind(),
            }),
        }
    }

    fn on_settled(&mut self, settled: Settled) {
        // A superseded save still landed remotely; keep its change tag.
        if let Some(record) = settled.record {
            self.snapshot = record;
        }

        let result = settled.result.as_ref().map(|_| ()).map_err(|e| e.to_string());
        let actions = self.step(Event::Settled {
            op: settled.op,
            result,
        });
        self.perform(actions, Some(&settled.result));
    }

    fn step(&mut self, event: Event) -> Vec<Action> {
        let (machine, actions) = std::mem::take(&mut self.machine).on_event(event);
        self.machine = machine;
        actions
    }

    /// Execute the machine's actions. `result` is the typed outcome of the
    /// settling job, if this step is a settlement.
    fn perform(
        &mut self,
        actions: Vec<Action>,
        result: Option<&Result<(), ItemError>>,
    ) -> Option<Ticket> {
        let mut ticket = None;

        for action in actions {
            match action {
                Action::Issued { op, kind, chained } => {
                    if chained {
                        tracing::debug!("Item {}: {} {} queued", self.snapshot.id, kind, op);
                    }
                    ticket = Some(Ticket::Reflection(self.observe(op)));
                }
                Action::Launch { op, kind } => self.launch(op, kind),
                Action::Refuse { request, status } => {
                    tracing::warn!(
                        "Item {}: {} refused while {}",
                        self.snapshot.id,
                        request,
                        status
                    );
                }
                Action::DeleteRemote => {
                    ticket = Some(Ticket::Deletion(self.delete_remote()));
                }
                Action::Resolve { op, settlement } => {
                    let outcome = match (settlement, result) {
                        (Settlement::Superseded, result) => {
                            if let Some(Err(e)) = result {
                                tracing::warn!(
                                    "Item {}: superseded {} failed: {}",
                                    self.snapshot.id,
                                    op,
                                    e
                                );
                            }
                            Ok(Reflected::Superseded)
                        }
                        (_, Some(Err(e))) => Err(e.clone()),
                        _ => Ok(Reflected::Completed),
                    };
                    self.resolve(op, outcome);
                }
                Action::EmitStatus(status) => {
                    match &status {
                        SyncStatus::Synced => tracing::info!("Item {} synced", self.snapshot.id),
                        SyncStatus::Error { cause } => {
                            tracing::warn!("Item {} in error: {}", self.snapshot.id, cause)
                        }
                        SyncStatus::Networking { .. } => {}
                    }
                    self.status_tx.send_replace(status);
                }
            }
        }

        ticket
    }

    fn observe(&mut self, op: OpId) -> Reflection {
        let (tx, rx) = oneshot::channel();
        self.observers.entry(op).or_default().push(tx);
        Reflection { op, rx }
    }

    fn resolve(&mut self, op: OpId, outcome: Outcome) {
        for observer in self.observers.remove(&op).unwrap_or_default() {
            let _ = observer.send(outcome.clone());
        }
    }

    fn launch(&self, op: OpId, kind: OpKind) {
        tracing::debug!("Item {}: launching {} {}", self.snapshot.id, kind, op);

        let backends = self.backends.clone();
        let snapshot = self.snapshot.clone();
        let path = self.path.clone();
        let settled_tx = self.settled_tx.clone();

        tokio::spawn(async move {
            let (record, result) = run_job(kind, &backends, snapshot, &path).await;
            let _ = settled_tx.send(Settled { op, record, result });
        });
    }

    fn delete_remote(&self) -> Deletion {
        let (tx, rx) = oneshot::channel();
        let remote = Arc::clone(&self.backends.remote);
        let id = self.snapshot.id;

        tokio::spawn(async move {
            let result = remote.delete(&id).await.map_err(ItemError::from);
            match &result {
                Ok(()) => tracing::info!("Deleted record {}", id),
                Err(e) => tracing::warn!("Delete of record {} failed: {}", id, e),
            }
            let _ = tx.send(result);
        });

        Deletion { rx }
    }
}

async fn run_job(
    kind: OpKind,
    backends: &Backends,
    snapshot: Record,
    path: &Path,
) -> (Option<Record>, Result<(), ItemError>) {
    match kind {
        OpKind::Upload => publish(backends, snapshot, path, SavePolicy::IfServerRecordUnchanged).await,
        OpKind::Replace => publish(backends, snapshot, path, SavePolicy::ChangedKeys).await,
        OpKind::Download => pull(backends, snapshot.id, path).await,
    }
}

/// Read, hash and save the local bytes.
async fn publish(
    backends: &Backends,
    snapshot: Record,
    path: &Path,
    policy: SavePolicy,
) -> (Option<Record>, Result<(), ItemError>) {
    let data = match backends.local.read(path).await {
        Ok(data) => data,
        Err(e) => return (None, Err(e.into())),
    };
    let checksum = backends.hasher.digest(&data);
    let record = snapshot.with_payload(data, checksum);

    match backends.remote.save(&record, policy).await {
        Ok(saved) => (Some(saved), Ok(())),
        Err(e) => (None, Err(e.into())),
    }
}

/// Fetch the record and write its payload locally.
async fn pull(backends: &Backends, id: RecordId, path: &Path) -> (Option<Record>, Result<(), ItemError>) {
    let record = match backends.remote.fetch(&id).await {
        Ok(record) => record,
        Err(e) => return (None, Err(e.into())),
    };
    let result = match &record.data {
        Some(data) => backends.local.write(path, data).await.map_err(ItemError::from),
        None => Err(ItemError::MissingPayload { id }),
    };
    (Some(record), result)
}
