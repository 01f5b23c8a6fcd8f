// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Ordered, fire-and-forget persistence.
//!
//! A single task owns every write to the key-value store. Stores hand it a
//! fully serialized snapshot of their collection after each mutation and
//! return immediately. Writes are applied in submission order, so the last
//! snapshot submitted is the one that ends up on disk. Failures never reach
//! the submitter; they are reported to a [`WriteObserver`].

use crate::kv::{KeyValueStore, KvError};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Receives the outcome of every write the queue applies.
pub trait WriteObserver: Send + Sync + std::fmt::Debug {
    fn write_completed(&self, _key: &str) {}

    fn write_failed(&self, key: &str, error: &KvError);
}

/// Default observer: reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl WriteObserver for LogObserver {
    fn write_completed(&self, key: &str) {
        debug!("Persisted {}", key);
    }

    fn write_failed(&self, key: &str, error: &KvError) {
        warn!("Failed to persist {}: {}", key, error);
    }
}

#[derive(Debug)]
enum Task {
    Set { key: String, value: String },
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct WriteQueue {
    sender: mpsc::UnboundedSender<Task>,
}

impl WriteQueue {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>, observer: Arc<dyn WriteObserver>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();

        tokio::spawn(async move {
            while let Some(task) = receiver.recv().await {
                match task {
                    Task::Set { key, value } => match store.set(&key, &value).await {
                        Ok(()) => observer.write_completed(&key),
                        Err(e) => observer.write_failed(&key, &e),
                    },
                    Task::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Write queue closed");
        });

        Self { sender }
    }

    /// Serialize `value` now and queue it for storage under `key`.
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.submit(Task::Set {
                key: key.to_string(),
                value: json,
            }),
            Err(e) => warn!("Failed to serialize {}: {}", key, e),
        }
    }

    /// Wait until every write submitted before this call has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Task::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    fn submit(&self, task: Task) {
        if self.sender.send(task).is_err() {
            error!("Write queue is closed, dropping write");
        }
    }
}

/// Read the JSON array stored under `key`.
///
/// Never fails: a missing key, an unreadable store or malformed content all
/// yield an empty collection, so a damaged record cannot block startup.
pub async fn load_collection<T>(store: &dyn KeyValueStore, key: &str) -> Vec<T>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let content = match store.get(key).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!("No stored record for {}", key);
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&content) {
        Ok(items) => {
            debug!("Loaded {} entries from {}", items.len(), key);
            items
        }
        Err(e) => {
            warn!("Ignoring malformed record {}: {}", key, e);
            Vec::new()
        }
    }
}
