//! Ring owned by a single task.
//!
//! [`start`] moves a [`Ring`] into a tokio task and returns a
//! [`RingHandle`]. Every operation is a message to that task and is applied
//! in arrival order, so no lock is needed and writes are totally ordered
//! with reads. The task stops when every handle is dropped or
//! [`RingHandle::shutdown`] is called.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::RingError;
use crate::ring::Ring;

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Insert {
        owner: String,
        reply: Reply<Result<(), RingError>>,
    },
    InsertChecked {
        owner: String,
        reply: Reply<Result<(), RingError>>,
    },
    Remove {
        owner: String,
        reply: Reply<usize>,
    },
    Find {
        key: Vec<u8>,
        reply: Reply<Result<String, RingError>>,
    },
    FindN {
        key: Vec<u8>,
        n: usize,
        reply: Reply<Result<Vec<String>, RingError>>,
    },
    Snapshot {
        reply: Reply<Ring>,
    },
    Len {
        reply: Reply<usize>,
    },
    Shutdown,
}

/// Cloneable handle to a running ring task.
#[derive(Debug, Clone)]
pub struct RingHandle {
    tx: mpsc::Sender<Command>,
}

/// Spawn a task that owns `ring`.
///
/// Must be called from within a tokio runtime.
pub fn start(ring: Ring) -> RingHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    tokio::spawn(run(ring, rx));
    RingHandle { tx }
}

async fn run(mut ring: Ring, mut rx: mpsc::Receiver<Command>) {
    info!(replication = ring.replication(), "ring service started");

    while let Some(cmd) = rx.recv().await {
        // A dropped reply receiver means the caller gave up; nothing to do.
        match cmd {
            Command::Insert { owner, reply } => {
                let _ = reply.send(ring.insert(&owner));
            }
            Command::InsertChecked { owner, reply } => {
                let _ = reply.send(ring.insert_checked(&owner));
            }
            Command::Remove { owner, reply } => {
                let _ = reply.send(ring.remove(&owner));
            }
            Command::Find { key, reply } => {
                let _ = reply.send(ring.find(&key).map(str::to_string));
            }
            Command::FindN { key, n, reply } => {
                let owners = ring
                    .find_n(&key, n)
                    .map(|owners| owners.into_iter().map(str::to_string).collect());
                let _ = reply.send(owners);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(ring.clone());
            }
            Command::Len { reply } => {
                let _ = reply.send(ring.len());
            }
            Command::Shutdown => {
                debug!("ring service received shutdown");
                break;
            }
        }
    }

    info!(positions = ring.len(), "ring service stopped");
}

impl RingHandle {
    /// See [`Ring::insert`].
    pub async fn insert(&self, owner: &str) -> Result<(), RingError> {
        let owner = owner.to_string();
        self.request(|reply| Command::Insert { owner, reply }).await?
    }

    /// See [`Ring::insert_checked`].
    pub async fn insert_checked(&self, owner: &str) -> Result<(), RingError> {
        let owner = owner.to_string();
        self.request(|reply| Command::InsertChecked { owner, reply }).await?
    }

    /// See [`Ring::remove`].
    pub async fn remove(&self, owner: &str) -> Result<usize, RingError> {
        let owner = owner.to_string();
        self.request(|reply| Command::Remove { owner, reply }).await
    }

    /// See [`Ring::find`].
    pub async fn find<K: AsRef<[u8]>>(&self, key: K) -> Result<String, RingError> {
        let key = key.as_ref().to_vec();
        self.request(|reply| Command::Find { key, reply }).await?
    }

    /// See [`Ring::find_n`].
    pub async fn find_n<K: AsRef<[u8]>>(&self, key: K, n: usize) -> Result<Vec<String>, RingError> {
        let key = key.as_ref().to_vec();
        self.request(|reply| Command::FindN { key, n, reply }).await?
    }

    /// Copy of the ring as of this request.
    pub async fn snapshot(&self) -> Result<Ring, RingError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Total number of occupied positions.
    pub async fn len(&self) -> Result<usize, RingError> {
        self.request(|reply| Command::Len { reply }).await
    }

    /// Stop the ring task once earlier commands are processed.
    ///
    /// Later calls on any handle fail with [`RingError::ServiceStopped`].
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    /// Whether the ring task is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, RingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| RingError::ServiceStopped)?;
        rx.await.map_err(|_| RingError::ServiceStopped)
    }
}
