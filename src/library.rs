// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! The user's local library: favorites and recently watched channels.
//!
//! A [`Library`] only exists once both collections have been hydrated from
//! durable storage, so nothing can read or mutate them while they are still
//! loading. Construct one per process and pass it by reference to whatever
//! needs it.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::favorites::FavoritesStore;
use crate::kv::{FileStore, KeyValueStore};
use crate::persist::{LogObserver, WriteObserver, WriteQueue};
use crate::recents::RecentsStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Library {
    queue: WriteQueue,
    favorites: FavoritesStore,
    recents: RecentsStore,
}

impl Library {
    /// Open the on-disk library described by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        let dir = config.storage_dir()?;
        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open library storage: {}", dir.display()))?;

        Ok(Self::hydrate(Arc::new(store), Arc::new(LogObserver), Arc::new(SystemClock)).await)
    }

    pub async fn hydrate(
        store: Arc<dyn KeyValueStore>,
        observer: Arc<dyn WriteObserver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let queue = WriteQueue::spawn(store.clone(), observer);

        let favorites = FavoritesStore::hydrate(store.as_ref(), queue.clone(), clock.clone()).await;
        let recents = RecentsStore::hydrate(store.as_ref(), queue.clone(), clock).await;

        debug!(
            "Library ready: {} favourites, {} recents",
            favorites.len(),
            recents.len()
        );

        Self {
            queue,
            favorites,
            recents,
        }
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn recents(&self) -> &RecentsStore {
        &self.recents
    }

    pub fn recents_mut(&mut self) -> &mut RecentsStore {
        &mut self.recents
    }

    /// Wait for every pending write to reach storage.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    /// Flush and drop the library. Short-lived processes call this before
    /// exiting so no write is lost with the runtime.
    pub async fn close(self) {
        self.flush().await;
    }
}
