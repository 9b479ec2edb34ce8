//! Per-request SQLite connection acquisition.
//!
//! Every request opens its own connection through [`Store::connect`] and
//! holds it in a [`ScopedConnection`]; the handle closes when the guard is
//! dropped, whichever way the request ends. The store counts live handles so
//! leaks are observable.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use snafu::{ResultExt, Snafu};

/// Errors raised while acquiring a connection.
#[derive(Debug, Snafu)]
pub enum StoreError {
    /// The database file could not be opened or configured.
    #[snafu(display("failed to open database at {}: {source}", path.display()))]
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
}

/// Handle to the one relational store the service talks to.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
    open_handles: Arc<AtomicUsize>,
}

impl Store {
    /// Create a store for the SQLite database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5_000),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set how long a connection waits on a locked database.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of connections currently checked out.
    pub fn open_connections(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Open a connection scoped to the caller.
    pub fn connect(&self) -> Result<ScopedConnection, StoreError> {
        let conn = Connection::open(&self.path).context(OpenSnafu { path: &self.path })?;
        conn.busy_timeout(self.busy_timeout)
            .context(OpenSnafu { path: &self.path })?;

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %self.path.display(), "connected to database");

        Ok(ScopedConnection {
            conn,
            open_handles: Arc::clone(&self.open_handles),
        })
    }
}

/// A connection that is released when dropped.
#[derive(Debug)]
pub struct ScopedConnection {
    conn: Connection,
    open_handles: Arc<AtomicUsize>,
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("database connection closed");
    }
}
