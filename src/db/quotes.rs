use chrono::Utc;
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tokio::time::Instant;

use crate::models::quote::QuoteRecord;

const INSERT_QUOTE: &str = "INSERT INTO cotacao (created_at, bid) VALUES (?1, ?2)";
const SELECT_LATEST_QUOTE: &str =
    "SELECT created_at, bid FROM cotacao ORDER BY rowid DESC LIMIT 1";
const CREATE_QUOTES_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS cotacao (created_at TIMESTAMP NOT NULL, bid TEXT NOT NULL)";

#[derive(Error, Debug)]
pub enum QuoteDbError {
    #[error("open database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("insert quote prepare: {0}")]
    Prepare(#[source] rusqlite::Error),
    #[error("insert quote exec: {0}")]
    Exec(#[source] rusqlite::Error),
    #[error("provision schema: {0}")]
    Schema(#[source] rusqlite::Error),
    #[error("query quote: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("insert quote exceeded {0:?}")]
    Timeout(Duration),
    #[error("insert quote task failed: {0}")]
    Join(#[from] JoinError),
}

/// Append-only access to the `cotacao` table. Every call opens and closes its
/// own connection.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    path: PathBuf,
}

impl QuoteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        QuoteRepository { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, QuoteDbError> {
        open_connection(&self.path)
    }

    /// Creates the `cotacao` table when missing. Provisioning only; the
    /// server expects the schema to exist already.
    pub fn provision(&self) -> Result<(), QuoteDbError> {
        let conn = self.open()?;

        conn.execute_batch(CREATE_QUOTES_TABLE).map_err(QuoteDbError::Schema)?;

        Ok(())
    }

    /// Inserts `(now, bid)`. Opening the connection, preparing and executing
    /// all run under `deadline`; once it elapses the insert is cancelled
    /// (a running statement is interrupted, a pending one never starts) and
    /// `Timeout` is returned.
    pub async fn insert_quote(&self, bid: &str, deadline: Duration) -> Result<(), QuoteDbError> {
        let expires = Instant::now() + deadline;
        let cancellation = Arc::new(Cancellation::default());
        let task = {
            let cancellation = Arc::clone(&cancellation);
            let path = self.path.clone();
            let bid = bid.to_owned();

            tokio::task::spawn_blocking(move || insert_at(&path, &bid, deadline, &cancellation))
        };

        match tokio::time::timeout_at(expires, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                cancellation.cancel();
                Err(QuoteDbError::Timeout(deadline))
            }
        }
    }

    pub fn latest_quote(&self) -> Result<Option<QuoteRecord>, QuoteDbError> {
        let conn = self.open()?;
        let record = conn
            .query_row(SELECT_LATEST_QUOTE, [], |row| {
                Ok(QuoteRecord {
                    created_at: row.get(0)?,
                    bid: row.get(1)?,
                })
            })
            .optional()?;

        Ok(record)
    }
}

fn open_connection(path: &Path) -> Result<Connection, QuoteDbError> {
    Connection::open(path).map_err(|source| QuoteDbError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Shared between an insert's async caller and its blocking task.
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    interrupt: Mutex<Option<InterruptHandle>>,
}

impl Cancellation {
    /// Registers the connection's interrupt handle. Returns `false` if the
    /// insert was already cancelled.
    fn arm(&self, handle: InterruptHandle) -> bool {
        let mut slot = self.interrupt.lock().unwrap_or_else(PoisonError::into_inner);

        *slot = Some(handle);

        !self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        let slot = self.interrupt.lock().unwrap_or_else(PoisonError::into_inner);

        self.cancelled.store(true, Ordering::SeqCst);

        if let Some(handle) = slot.as_ref() {
            handle.interrupt();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn insert_at(
    path: &Path,
    bid: &str,
    deadline: Duration,
    cancellation: &Cancellation,
) -> Result<(), QuoteDbError> {
    if cancellation.is_cancelled() {
        return Err(QuoteDbError::Timeout(deadline));
    }

    let conn = open_connection(path)?;

    conn.busy_timeout(deadline).map_err(|source| QuoteDbError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if !cancellation.arm(conn.get_interrupt_handle()) {
        return Err(QuoteDbError::Timeout(deadline));
    }

    let mut stmt = conn.prepare(INSERT_QUOTE).map_err(QuoteDbError::Prepare)?;

    if cancellation.is_cancelled() {
        return Err(QuoteDbError::Timeout(deadline));
    }

    stmt.execute(params![Utc::now(), bid]).map_err(QuoteDbError::Exec)?;

    Ok(())
}
