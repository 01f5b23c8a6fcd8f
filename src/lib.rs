// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod catalog;
pub mod clock;
pub mod config;
pub mod favorites;
pub mod kv;
pub mod library;
pub mod model;
pub mod persist;
pub mod player;
pub mod recents;
pub mod screen;

pub use catalog::{CatalogSource, FirestoreCatalog};
pub use config::Config;
pub use favorites::FavoritesStore;
pub use library::Library;
pub use player::Player;
pub use recents::RecentsStore;
