//! Typed failures of the store. Everything else travels as `anyhow::Error`
//! with context attached at the call site.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened at all. This is the one fatal
    /// condition of the store.
    #[error("failed to open blog post database at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// A thread panicked while holding the store lock.
    #[error("blog post store lock was poisoned")]
    Poisoned,
    /// The background worker thread is gone, so a submission can never be
    /// answered.
    #[error("blog post worker is not running")]
    WorkerGone,
    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}
