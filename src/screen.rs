// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Per-screen state: what each view fetches on mount, what it shows while
//! loading or after a failure, and how many grid columns it lays out.

use crate::catalog::{CatalogSource, sort_categories};
use crate::favorites::FavoritesStore;
use crate::library::Library;
use crate::model::{Category, Channel, FavoriteEntry};
use crate::player::PlaybackSurface;
use serde::{Deserialize, Serialize};
use tracing::error;

pub const CATEGORIES_ERROR: &str = "Failed to load categories. Please try again.";
pub const CHANNELS_ERROR: &str = "Failed to load channels.";

pub const NO_CATEGORIES: &str = "No Categories Available";
pub const NO_CHANNELS: &str = "There are no channels in this category yet.";
pub const NO_FAVORITES: &str = "Add channels to your favorites to see them here.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Phone,
    Tv,
}

/// Columns in the category grid.
pub fn category_columns(device: DeviceClass, width: u32) -> usize {
    match device {
        DeviceClass::Phone => 2,
        DeviceClass::Tv if width > 1500 => 5,
        DeviceClass::Tv if width > 1000 => 4,
        DeviceClass::Tv => 3,
    }
}

/// Columns in channel lists (category channels and favorites).
pub fn channel_columns(device: DeviceClass, width: u32) -> usize {
    match device {
        DeviceClass::Phone => 1,
        DeviceClass::Tv if width > 1500 => 4,
        DeviceClass::Tv if width > 1000 => 3,
        DeviceClass::Tv => 2,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(&'static str),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'static str> {
        match self {
            Self::Failed(message) => Some(*message),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct HomeScreen {
    state: LoadState<Vec<Category>>,
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
        }
    }

    pub async fn mount(&mut self, catalog: &dyn CatalogSource) {
        self.state = LoadState::Loading;
        self.state = match catalog.fetch_categories().await {
            Ok(mut categories) => {
                sort_categories(&mut categories);
                LoadState::Ready(categories)
            }
            Err(e) => {
                error!("Error fetching categories: {:#}", e);
                LoadState::Failed(CATEGORIES_ERROR)
            }
        };
    }

    pub fn state(&self) -> &LoadState<Vec<Category>> {
        &self.state
    }
}

#[derive(Debug)]
pub struct CategoryScreen {
    slug: String,
    state: LoadState<Vec<Channel>>,
}

impl CategoryScreen {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            state: LoadState::Loading,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub async fn mount(&mut self, catalog: &dyn CatalogSource) {
        self.state = LoadState::Loading;
        self.state = match catalog.fetch_channels(&self.slug).await {
            Ok(channels) => LoadState::Ready(channels),
            Err(e) => {
                error!("Error fetching channels for {}: {:#}", self.slug, e);
                LoadState::Failed(CHANNELS_ERROR)
            }
        };
    }

    pub fn state(&self) -> &LoadState<Vec<Channel>> {
        &self.state
    }

    pub fn find(&self, channel_id: &str) -> Option<&Channel> {
        self.state
            .ready()
            .and_then(|channels| channels.iter().find(|c| c.id == channel_id))
    }
}

/// Favorites, newest addition first.
pub fn favorites_view(favorites: &FavoritesStore) -> Vec<FavoriteEntry> {
    favorites.sorted_by_recently_added()
}

/// The playback view. Opening it records the channel as watched.
#[derive(Debug)]
pub struct PlayerScreen {
    channel: Channel,
    surface: PlaybackSurface,
}

impl PlayerScreen {
    pub fn open(channel: Channel, library: &mut Library) -> Self {
        library.recents_mut().add_recent(&channel);
        let surface = PlaybackSurface::new(channel.name.clone());
        Self { channel, surface }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn is_favorite(&self, library: &Library) -> bool {
        library.favorites().is_favorite(&self.channel.id)
    }

    /// Returns whether the channel is a favorite afterwards.
    pub fn toggle_favorite(&self, library: &mut Library) -> bool {
        library.favorites_mut().toggle(&self.channel)
    }

    pub fn surface(&self) -> &PlaybackSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PlaybackSurface {
        &mut self.surface
    }
}
