//! Core library surface for the blog post list application.
//!
//! The persistence layer (`db`) and the record type (`models`) are the
//! reusable part; `worker` moves store calls off the UI thread and `ui` is the
//! terminal screen that drives them.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;
pub mod worker;

/// Convenience re-exports for the persistence layer.
pub use db::{BlogPostStore, StoreHandle};

pub use config::AppConfig;
pub use error::StoreError;
pub use models::{BlogPost, UNKNOWN_ID};
pub use worker::{Pending, StoreWorker};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
