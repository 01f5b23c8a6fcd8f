// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::clock::Clock;
use crate::kv::KeyValueStore;
use crate::model::{Channel, RecentEntry};
use crate::persist::{WriteQueue, load_collection};
use std::sync::Arc;
use tracing::debug;

pub const RECENTS_KEY: &str = "iptv-recents";

/// Upper bound on remembered channels.
pub const MAX_RECENTS: usize = 20;

/// Recently watched channels, newest first, mirrored to the key-value store.
#[derive(Debug)]
pub struct RecentsStore {
    recents: Vec<RecentEntry>,
    queue: WriteQueue,
    clock: Arc<dyn Clock>,
}

impl RecentsStore {
    pub async fn hydrate(
        store: &dyn KeyValueStore,
        queue: WriteQueue,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let loaded: Vec<RecentEntry> = load_collection(store, RECENTS_KEY).await;

        Self {
            recents: normalize(loaded),
            queue,
            clock,
        }
    }

    /// Record a watch of `channel`: it moves to the front, any older entry for
    /// the same id is dropped, and the oldest entries fall off past the cap.
    pub fn add_recent(&mut self, channel: &Channel) {
        let mut watched_at = self.clock.now_millis();
        // Keep the order strict when the clock has not moved past the newest entry.
        if let Some(newest) = self.recents.first()
            && watched_at <= newest.watched_at
        {
            watched_at = newest.watched_at.saturating_add(1);
        }

        let entry = RecentEntry::from_channel(channel, watched_at);
        self.recents.retain(|r| r.id != entry.id);
        self.recents.insert(0, entry);
        self.recents.truncate(MAX_RECENTS);

        debug!("Recorded watch of {} at {}", channel.id, watched_at);
        self.persist();
    }

    pub fn clear_recents(&mut self) {
        self.recents.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.recents
    }

    pub fn latest(&self) -> Option<&RecentEntry> {
        self.recents.first()
    }

    pub fn len(&self) -> usize {
        self.recents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recents.is_empty()
    }

    fn persist(&self) {
        self.queue.write_json(RECENTS_KEY, &self.recents);
    }
}

// A hand-edited record may be unsorted, repeat ids or exceed the cap.
fn normalize(mut recents: Vec<RecentEntry>) -> Vec<RecentEntry> {
    recents.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));

    let mut seen = std::collections::HashSet::new();
    recents.retain(|r| seen.insert(r.id.clone()));
    recents.truncate(MAX_RECENTS);
    recents
}
