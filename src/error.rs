//! Error types for the synchronizer.
//!
//! Each variant maps to one recovery policy inside a pass:
//! - `NotFound` skips a bundle family quietly
//! - `Read` / `Write` skip a single file
//! - `Persistence` rolls back a single file's batch
//! - `Delivery` is logged per recipient

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reconciling bundles with the database.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Expected absence, e.g. a missing base bundle.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File could not be read or decoded.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database operation or transaction failed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Notification could not be delivered.
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },

    /// Character set label is not known.
    #[error("unsupported character set: {0}")]
    Charset(String),

    /// No tenant is registered for the host, not even the wildcard one.
    #[error("no tenant registered for host '{0}'")]
    TenantNotFound(String),

    /// An I/O operation did not complete in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl From<mongodb::error::Error> for SyncError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
