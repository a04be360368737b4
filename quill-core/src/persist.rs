//! Background writer that owns the storage connection.
//!
//! Store mutations happen on the UI task and must never wait on disk, so each
//! mutation sends a [`StoreSnapshot`] over a channel and this task writes it.
//! Snapshots that queue up behind a slow write are coalesced: only the newest
//! one is written.

use tokio::sync::{mpsc, oneshot};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::buffers::StoreSnapshot;
use crate::error::StorageError;
use crate::storage::{self, ACTIVE_BUFFER_KEY, BUFFERS_KEY};

enum WriterCommand {
    Save(StoreSnapshot),
    Flush(oneshot::Sender<()>),
}

/// Sending half of the persistence writer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl std::fmt::Debug for WriterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriterCommand::Save(_) => f.write_str("Save"),
            WriterCommand::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl PersistHandle {
    /// Queues `snapshot` for writing. Never blocks; a closed writer is logged.
    pub fn save(&self, snapshot: StoreSnapshot) {
        if self.tx.send(WriterCommand::Save(snapshot)).is_err() {
            warn!("persistence writer is gone; dropping snapshot");
        }
    }

    /// Waits until every snapshot queued before this call has been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriterClosed` if the writer task has exited.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriterCommand::Flush(done_tx))
            .map_err(|_| StorageError::WriterClosed)?;
        done_rx.await.map_err(|_| StorageError::WriterClosed)
    }
}

/// Spawns the writer task on the current runtime and returns its handle.
///
/// The task exits when every handle has been dropped.
pub fn spawn_writer(conn: Connection) -> PersistHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(writer_loop(conn, rx));
    PersistHandle { tx }
}

async fn writer_loop(conn: Connection, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        collect(command, &mut latest, &mut waiters);
        while let Ok(command) = rx.try_recv() {
            collect(command, &mut latest, &mut waiters);
        }

        if let Some(snapshot) = latest {
            if let Err(e) = write_snapshot(&conn, snapshot).await {
                warn!(error = %e, "failed to persist editor state");
            }
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
    debug!("persistence writer stopped");
}

fn collect(
    command: WriterCommand,
    latest: &mut Option<StoreSnapshot>,
    waiters: &mut Vec<oneshot::Sender<()>>,
) {
    match command {
        WriterCommand::Save(snapshot) => *latest = Some(snapshot),
        WriterCommand::Flush(done) => waiters.push(done),
    }
}

async fn write_snapshot(conn: &Connection, snapshot: StoreSnapshot) -> Result<(), StorageError> {
    storage::put_values(
        conn,
        vec![
            (BUFFERS_KEY.to_owned(), snapshot.buffers_json),
            (ACTIVE_BUFFER_KEY.to_owned(), snapshot.active_id),
        ],
    )
    .await?;
    Ok(())
}
