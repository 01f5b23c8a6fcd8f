// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub category_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A favorited channel as persisted under the favorites key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: String,
    pub name: String,
    pub stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub added_at: i64,
}

impl FavoriteEntry {
    pub fn from_channel(channel: &Channel, added_at: i64) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            stream_url: channel.stream_url.clone(),
            logo_url: channel.logo_url.clone(),
            added_at,
        }
    }
}

/// A watched channel as persisted under the recents key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: String,
    pub name: String,
    pub stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub watched_at: i64,
}

impl RecentEntry {
    pub fn from_channel(channel: &Channel, watched_at: i64) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            stream_url: channel.stream_url.clone(),
            logo_url: channel.logo_url.clone(),
            watched_at,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_channel(id: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: format!("Channel {}", id),
        stream_url: format!("https://streams.example.com/{}.m3u8", id),
        logo_url: None,
        category_slug: "news".to_string(),
        epg_id: None,
        country: None,
    }
}
