// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::config::CatalogConfig;
use crate::model::{Category, Channel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

const CATEGORIES_COLLECTION: &str = "categories";
const CHANNELS_COLLECTION: &str = "channels";
const PAGE_SIZE: u32 = 300;

/// Read-only access to the remote channel catalog. Every call is a single
/// request/response exchange with no retry.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>>;

    /// Channels whose `categorySlug` equals `slug`, in no particular order.
    async fn fetch_channels(&self, slug: &str) -> Result<Vec<Channel>>;
}

/// Order used by the category grid: explicit `order` when both sides have
/// one, otherwise by name.
pub fn compare_categories(a: &Category, b: &Category) -> Ordering {
    if let (Some(x), Some(y)) = (a.order, b.order) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    locale_compare(&a.name, &b.name)
}

// Approximates a default-locale collation: letters compare case-insensitively
// first, and on a tie lowercase sorts before uppercase.
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Sort categories in place with [`compare_categories`].
///
/// The comparator mixes two keys and is not a total order when only some
/// categories carry `order`, so this uses a stable insertion sort that
/// tolerates inconsistent answers instead of `slice::sort_by`.
pub fn sort_categories(categories: &mut [Category]) {
    for i in 1..categories.len() {
        let mut j = i;
        while j > 0 && compare_categories(&categories[j - 1], &categories[j]) == Ordering::Greater
        {
            categories.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Catalog backed by a Firestore database, spoken to over its REST API.
#[derive(Debug)]
pub struct FirestoreCatalog {
    client: Client,
    documents_url: String,
    api_key: Option<String>,
}

impl FirestoreCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base = url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid catalog base URL: {}", config.base_url))?;

        if config.project_id.trim().is_empty() {
            anyhow::bail!("catalog.project_id is not set");
        }

        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            base.as_str().trim_end_matches('/'),
            config.project_id
        );

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            documents_url,
            api_key: config.api_key.clone(),
        })
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn list_collection(&self, collection: &str) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.documents_url, collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            debug!("Listing {} (page token: {:?})", collection, page_token);
            let response = self
                .with_key(request)
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", url))?;

            if !response.status().is_success() {
                return Err(anyhow::anyhow!(
                    "Listing {} failed with status: {}",
                    collection,
                    response.status()
                ));
            }

            let page: Value = response
                .json()
                .await
                .with_context(|| format!("Failed to parse {} listing", collection))?;

            if let Some(docs) = page.get("documents").and_then(Value::as_array) {
                documents.extend(docs.iter().cloned());
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn query_equal(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": value },
                    }
                }
            }
        });

        debug!("Querying {} where {} == {}", collection, field, value);
        let response = self
            .with_key(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Query on {} failed with status: {}",
                collection,
                response.status()
            ));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} query response", collection))?;

        // Rows without a document only carry read metadata.
        Ok(rows
            .into_iter()
            .filter_map(|mut row| row.get_mut("document").map(Value::take))
            .collect())
    }
}

#[async_trait]
impl CatalogSource for FirestoreCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let documents = self.list_collection(CATEGORIES_COLLECTION).await?;
        Ok(decode_all(&documents))
    }

    async fn fetch_channels(&self, slug: &str) -> Result<Vec<Channel>> {
        let documents = self
            .query_equal(CHANNELS_COLLECTION, "categorySlug", slug)
            .await?;
        Ok(decode_all(&documents))
    }
}

fn decode_all<T>(documents: &[Value]) -> Vec<T>
where
    T: for<'de> serde::Deserialize<'de>,
{
    documents
        .iter()
        .filter_map(|doc| match decode_document::<T>(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed document: {:#}", e);
                None
            }
        })
        .collect()
}

/// Turn a Firestore document into `T`, with the document id as `id` and the
/// stored fields layered on top.
pub fn decode_document<T>(document: &Value) -> Result<T>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Document has no name"))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(id.to_string()));

    if let Some(fields) = document.get("fields").and_then(Value::as_object) {
        for (key, value) in fields {
            object.insert(key.clone(), decode_value(value));
        }
    }

    serde_json::from_value(Value::Object(object))
        .with_context(|| format!("Failed to decode document {}", name))
}

fn decode_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "referenceValue" | "timestampValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        },
        "doubleValue" | "booleanValue" => inner.clone(),
        "mapValue" => {
            let mut map = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_object) {
                for (key, value) in fields {
                    map.insert(key.clone(), decode_value(value));
                }
            }
            Value::Object(map)
        }
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, order: Option<f64>) -> Category {
        Category {
            id: name.to_lowercase(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            icon_url: None,
            order,
        }
    }

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn explicit_order_wins_when_both_present() {
        let mut categories = vec![
            category("Sports", Some(2.0)),
            category("News", Some(-1.0)),
            category("Movies", Some(0.5)),
        ];
        sort_categories(&mut categories);
        assert_eq!(names(&categories), vec!["News", "Movies", "Sports"]);
    }

    #[test]
    fn falls_back_to_name_when_order_missing() {
        let mut categories = vec![
            category("sports", None),
            category("Kids", None),
            category("documentary", None),
        ];
        sort_categories(&mut categories);
        assert_eq!(names(&categories), vec!["documentary", "Kids", "sports"]);
    }

    #[test]
    fn lowercase_sorts_first_on_case_tie() {
        assert_eq!(locale_compare("news", "News"), Ordering::Less);
        assert_eq!(locale_compare("News", "news"), Ordering::Greater);
        assert_eq!(locale_compare("News", "News"), Ordering::Equal);
    }

    #[test]
    fn colliding_orders_keep_input_order() {
        let mut categories = vec![
            category("B", Some(1.0)),
            category("A", Some(1.0)),
            category("C", Some(0.0)),
        ];
        sort_categories(&mut categories);
        assert_eq!(names(&categories), vec!["C", "B", "A"]);
    }

    #[test]
    fn mixed_orders_leave_no_adjacent_inversion() {
        let mut categories = vec![
            category("Zulu", Some(1.0)),
            category("Mike", None),
            category("Alpha", Some(2.0)),
            category("Echo", None),
        ];
        sort_categories(&mut categories);
        // Zulu/Alpha are ordered by `order`, Zulu/Mike and Alpha/Echo by name.
        assert_eq!(names(&categories), vec!["Mike", "Zulu", "Alpha", "Echo"]);
        assert!(
            categories
                .windows(2)
                .all(|w| compare_categories(&w[0], &w[1]) != Ordering::Greater)
        );

        let mut unordered_first = vec![
            category("Mike", None),
            category("Echo", None),
            category("Zulu", Some(1.0)),
        ];
        sort_categories(&mut unordered_first);
        assert_eq!(names(&unordered_first), vec!["Echo", "Mike", "Zulu"]);
    }

    #[test]
    fn decodes_typed_firestore_fields() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/channels/abc123",
            "fields": {
                "name": { "stringValue": "Sky News" },
                "streamUrl": { "stringValue": "https://example.com/sky.m3u8" },
                "categorySlug": { "stringValue": "news" },
                "logoUrl": { "nullValue": null },
                "country": { "stringValue": "UK" }
            },
            "createTime": "2024-01-01T00:00:00Z"
        });

        let channel: Channel = decode_document(&document).unwrap();
        assert_eq!(channel.id, "abc123");
        assert_eq!(channel.name, "Sky News");
        assert_eq!(channel.category_slug, "news");
        assert!(channel.logo_url.is_none());
        assert_eq!(channel.country.as_deref(), Some("UK"));
    }

    #[test]
    fn decodes_integer_and_double_orders() {
        let as_int = json!({
            "name": "projects/p/databases/(default)/documents/categories/news",
            "fields": {
                "name": { "stringValue": "News" },
                "slug": { "stringValue": "news" },
                "order": { "integerValue": "3" }
            }
        });
        let as_double = json!({
            "name": "projects/p/databases/(default)/documents/categories/kids",
            "fields": {
                "name": { "stringValue": "Kids" },
                "slug": { "stringValue": "kids" },
                "order": { "doubleValue": 1.5 }
            }
        });

        let news: Category = decode_document(&as_int).unwrap();
        let kids: Category = decode_document(&as_double).unwrap();
        assert_eq!(news.order, Some(3.0));
        assert_eq!(kids.order, Some(1.5));
        assert_eq!(kids.id, "kids");
    }

    #[test]
    fn decodes_nested_values() {
        let value = json!({
            "mapValue": { "fields": {
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "hd" },
                    { "booleanValue": true }
                ]}}
            }}
        });
        assert_eq!(decode_value(&value), json!({ "tags": ["hd", true] }));
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let documents = vec![
            json!({ "fields": {} }),
            json!({
                "name": "projects/p/databases/(default)/documents/categories/ok",
                "fields": {
                    "name": { "stringValue": "Ok" },
                    "slug": { "stringValue": "ok" }
                }
            }),
        ];
        let categories: Vec<Category> = decode_all(&documents);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "ok");
    }

    #[test]
    fn rejects_bad_base_url() {
        let config = CatalogConfig {
            base_url: "not a url".to_string(),
            ..CatalogConfig::default()
        };
        assert!(FirestoreCatalog::new(&config).is_err());
    }
}
