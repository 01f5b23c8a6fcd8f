// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::clock::Clock;
use crate::kv::KeyValueStore;
use crate::model::{Channel, FavoriteEntry};
use crate::persist::{WriteQueue, load_collection};
use std::sync::Arc;
use tracing::debug;

pub const FAVORITES_KEY: &str = "iptv-favorites";

/// Favorited channels, mirrored to the key-value store.
///
/// Entries keep insertion order. Ids are unique; re-adding a channel moves it
/// to the end with a fresh `added_at`.
#[derive(Debug)]
pub struct FavoritesStore {
    favorites: Vec<FavoriteEntry>,
    queue: WriteQueue,
    clock: Arc<dyn Clock>,
}

impl FavoritesStore {
    /// Load favorites from `store`. Always completes; anything unreadable is
    /// treated as having no favorites yet.
    pub async fn hydrate(
        store: &dyn KeyValueStore,
        queue: WriteQueue,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let loaded: Vec<FavoriteEntry> = load_collection(store, FAVORITES_KEY).await;

        let mut favorites: Vec<FavoriteEntry> = Vec::with_capacity(loaded.len());
        for entry in loaded {
            favorites.retain(|f| f.id != entry.id);
            favorites.push(entry);
        }

        Self {
            favorites,
            queue,
            clock,
        }
    }

    pub fn add(&mut self, channel: &Channel) {
        let entry = FavoriteEntry::from_channel(channel, self.clock.now_millis());
        self.favorites.retain(|f| f.id != entry.id);
        self.favorites.push(entry);
        debug!("Added favourite {}", channel.id);
        self.persist();
    }

    pub fn remove(&mut self, channel_id: &str) {
        self.favorites.retain(|f| f.id != channel_id);
        self.persist();
    }

    pub fn is_favorite(&self, channel_id: &str) -> bool {
        self.favorites.iter().any(|f| f.id == channel_id)
    }

    /// Add the channel if it is not a favorite, remove it otherwise.
    /// Returns whether the channel is a favorite afterwards.
    pub fn toggle(&mut self, channel: &Channel) -> bool {
        if self.is_favorite(&channel.id) {
            self.remove(&channel.id);
            false
        } else {
            self.add(channel);
            true
        }
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Most recently added first.
    pub fn sorted_by_recently_added(&self) -> Vec<FavoriteEntry> {
        let mut sorted = self.favorites.clone();
        sorted.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        sorted
    }

    fn persist(&self) {
        self.queue.write_json(FAVORITES_KEY, &self.favorites);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::kv::MemoryStore;
    use crate::model::test_channel;
    use crate::persist::LogObserver;
    use crate::persist::testing::{ReadOnlyStore, RecordingObserver};

    async fn open(store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> (FavoritesStore, WriteQueue) {
        let queue = WriteQueue::spawn(store.clone(), Arc::new(LogObserver));
        let favorites = FavoritesStore::hydrate(&*store, queue.clone(), clock).await;
        (favorites, queue)
    }

    fn ids(favorites: &FavoritesStore) -> Vec<&str> {
        favorites.entries().iter().map(|f| f.id.as_str()).collect()
    }

    #[tokio::test]
    async fn re_adding_moves_entry_to_end_with_new_timestamp() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let (mut favorites, _queue) = open(store, clock.clone()).await;

        favorites.add(&test_channel("1"));
        clock.advance(10);
        favorites.add(&test_channel("2"));
        clock.advance(10);
        favorites.add(&test_channel("1"));

        assert_eq!(ids(&favorites), vec!["2", "1"]);
        assert_eq!(favorites.entries()[1].added_at, 1_020);
        assert_eq!(favorites.entries()[0].added_at, 1_010);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let (mut favorites, _queue) = open(store, Arc::new(ManualClock::new(0))).await;

        favorites.add(&test_channel("1"));
        favorites.add(&test_channel("2"));
        favorites.remove("1");
        let after_first = favorites.entries().to_vec();
        favorites.remove("1");
        favorites.remove("missing");

        assert_eq!(favorites.entries(), after_first.as_slice());
        assert!(!favorites.is_favorite("1"));
        assert!(favorites.is_favorite("2"));
    }

    #[tokio::test]
    async fn toggle_flips_membership() {
        let store = Arc::new(MemoryStore::new());
        let (mut favorites, _queue) = open(store, Arc::new(ManualClock::new(0))).await;
        let channel = test_channel("9");

        assert!(favorites.toggle(&channel));
        assert!(favorites.is_favorite("9"));
        assert!(!favorites.toggle(&channel));
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn mutations_are_mirrored_to_store() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(500));
        let (mut favorites, queue) = open(store.clone(), clock).await;

        favorites.add(&test_channel("a"));
        favorites.add(&test_channel("b"));
        favorites.remove("a");
        queue.flush().await;

        let record = store.get(FAVORITES_KEY).await.unwrap().unwrap();
        let persisted: Vec<FavoriteEntry> = serde_json::from_str(&record).unwrap();
        assert_eq!(persisted, favorites.entries());
    }

    #[tokio::test]
    async fn hydrate_reproduces_persisted_collection() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(100));
        let (mut favorites, queue) = open(store.clone(), clock.clone()).await;
        for id in ["x", "y", "z"] {
            favorites.add(&test_channel(id));
            clock.advance(1);
        }
        favorites.add(&test_channel("x"));
        queue.flush().await;

        let (reloaded, _queue) = open(store, clock).await;
        assert_eq!(reloaded.entries(), favorites.entries());
    }

    #[tokio::test]
    async fn hydrate_from_malformed_record_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(FAVORITES_KEY, "{not json").await.unwrap();

        let (favorites, _queue) = open(store, Arc::new(ManualClock::new(0))).await;
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn hydrate_collapses_duplicate_ids() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                FAVORITES_KEY,
                r#"[
                    {"id":"1","name":"One","streamUrl":"u1","addedAt":1},
                    {"id":"2","name":"Two","streamUrl":"u2","addedAt":2},
                    {"id":"1","name":"One","streamUrl":"u1","addedAt":3}
                ]"#,
            )
            .await
            .unwrap();

        let (favorites, _queue) = open(store, Arc::new(ManualClock::new(0))).await;
        assert_eq!(ids(&favorites), vec!["2", "1"]);
        assert_eq!(favorites.entries()[1].added_at, 3);
    }

    #[tokio::test]
    async fn sorted_view_is_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let (mut favorites, _queue) = open(store, clock.clone()).await;

        for id in ["a", "b", "c"] {
            clock.advance(5);
            favorites.add(&test_channel(id));
        }
        let sorted: Vec<String> = favorites
            .sorted_by_recently_added()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(sorted, vec!["c", "b", "a"]);
        assert_eq!(ids(&favorites), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn write_failures_do_not_roll_back() {
        let observer = Arc::new(RecordingObserver::default());
        let store = Arc::new(ReadOnlyStore::default());
        let queue = WriteQueue::spawn(store.clone(), observer.clone());
        let mut favorites =
            FavoritesStore::hydrate(&*store, queue.clone(), Arc::new(ManualClock::new(0)))
                .await;

        favorites.add(&test_channel("1"));
        queue.flush().await;

        assert!(favorites.is_favorite("1"));
        assert_eq!(observer.failed.lock().unwrap().len(), 1);
    }
}
