//! Background worker that runs store operations off the UI thread.
//!
//! Submissions are queued on a channel and executed one at a time, in order,
//! by a dedicated thread. Each submission hands back a [`Pending`] that the
//! caller can poll from its render loop or block on.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::db::StoreHandle;
use crate::error::StoreError;
use crate::models::BlogPost;

enum StoreCommand {
    Add {
        title: String,
        reply: Sender<Result<Option<BlogPost>>>,
    },
    Delete {
        title: String,
        reply: Sender<Result<usize>>,
    },
    Rename {
        id: i64,
        title: String,
        reply: Sender<Result<usize>>,
    },
    LoadAll {
        reply: Sender<Result<Vec<BlogPost>>>,
    },
}

impl StoreCommand {
    fn name(&self) -> &'static str {
        match self {
            StoreCommand::Add { .. } => "add",
            StoreCommand::Delete { .. } => "delete",
            StoreCommand::Rename { .. } => "rename",
            StoreCommand::LoadAll { .. } => "load_all",
        }
    }

    fn run(self, store: &StoreHandle) {
        // A dropped `Pending` means nobody wants the answer any more.
        match self {
            StoreCommand::Add { title, reply } => {
                let _ = reply.send(store.add_blog_post(&BlogPost::with_title(title)));
            }
            StoreCommand::Delete { title, reply } => {
                let _ = reply.send(store.delete_blog_post(&BlogPost::with_title(title)));
            }
            StoreCommand::Rename { id, title, reply } => {
                let _ = reply.send(store.update_blog_post(&BlogPost::new(id, title)));
            }
            StoreCommand::LoadAll { reply } => {
                let _ = reply.send(store.get_all_blog_posts());
            }
        }
    }
}

/// A result the worker will deliver later.
pub struct Pending<T> {
    rx: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Take the result if it has arrived. Returns `None` while the worker is
    /// still busy; once a value has been taken the handle should be dropped.
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(StoreError::WorkerGone.into())),
        }
    }

    /// Block until the worker answers.
    pub fn wait(self) -> Result<T> {
        self.rx
            .recv()
            .map_err(|_| anyhow::Error::from(StoreError::WorkerGone))?
    }
}

pub struct StoreWorker {
    tx: Option<Sender<StoreCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// Start the worker thread. The thread keeps its own handle to the store
    /// and exits once every `StoreWorker` sender is gone and the queue is
    /// drained.
    pub fn spawn(store: StoreHandle) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<StoreCommand>();

        let handle = thread::Builder::new()
            .name("blog-post-store".to_owned())
            .spawn(move || {
                while let Ok(cmd) = rx.recv() {
                    debug!(command = cmd.name(), "running store command");
                    cmd.run(&store);
                }
                debug!("store worker stopped");
            })
            .context("failed to spawn store worker thread")?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn add(&self, title: impl Into<String>) -> Pending<Option<BlogPost>> {
        let title = title.into();
        self.submit(|reply| StoreCommand::Add { title, reply })
    }

    /// Delete the post whose title matches `title`, ignoring case.
    pub fn delete_by_title(&self, title: impl Into<String>) -> Pending<usize> {
        let title = title.into();
        self.submit(|reply| StoreCommand::Delete { title, reply })
    }

    pub fn rename(&self, id: i64, title: impl Into<String>) -> Pending<usize> {
        let title = title.into();
        self.submit(|reply| StoreCommand::Rename { id, title, reply })
    }

    pub fn load_all(&self) -> Pending<Vec<BlogPost>> {
        self.submit(|reply| StoreCommand::LoadAll { reply })
    }

    fn submit<T, F>(&self, build: F) -> Pending<T>
    where
        F: FnOnce(Sender<Result<T>>) -> StoreCommand,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        let command = build(reply_tx);

        // If the queue is closed the command, and its reply sender with it,
        // is dropped here, so the `Pending` reports `WorkerGone`.
        match &self.tx {
            Some(tx) => {
                if tx.send(command).is_err() {
                    warn!("store worker queue is closed");
                }
            }
            None => warn!("store worker already shut down"),
        }

        Pending { rx: reply_rx }
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("store worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BlogPostStore;

    fn worker() -> (StoreHandle, StoreWorker) {
        let store = BlogPostStore::open_in_memory().unwrap().into_handle();
        let worker = StoreWorker::spawn(StoreHandle::clone(&store)).unwrap();
        (store, worker)
    }

    #[test]
    fn add_then_load_sees_the_write() {
        let (_store, worker) = worker();

        let added = worker.add("Queued");
        let loaded = worker.load_all();

        let stored = added.wait().unwrap().unwrap();
        assert_eq!(stored.id, 0);
        let posts = loaded.wait().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Queued");
    }

    #[test]
    fn duplicate_add_reports_none() {
        let (store, worker) = worker();

        worker.add("Hello").wait().unwrap();
        assert!(worker.add("HELLO").wait().unwrap().is_none());
        assert_eq!(store.get_blog_posts_count().unwrap(), 1);
    }

    #[test]
    fn delete_and_rename_report_rows_touched() {
        let (store, worker) = worker();
        let stored = worker.add("Draft").wait().unwrap().unwrap();

        assert_eq!(worker.rename(stored.id, "Final").wait().unwrap(), 1);
        assert_eq!(worker.delete_by_title("missing").wait().unwrap(), 0);
        assert_eq!(worker.delete_by_title("final").wait().unwrap(), 1);
        assert_eq!(store.get_blog_posts_count().unwrap(), 0);
    }

    #[test]
    fn try_take_eventually_yields_result() {
        let (_store, worker) = worker();
        let pending = worker.load_all();

        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            thread::yield_now();
        };
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn pending_reports_worker_gone_when_reply_is_dropped() {
        let (reply_tx, reply_rx) = mpsc::channel::<Result<usize>>();
        drop(reply_tx);
        let pending = Pending { rx: reply_rx };

        let err = pending.try_take().unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::WorkerGone)
        ));
    }
}
