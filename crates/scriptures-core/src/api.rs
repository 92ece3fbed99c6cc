use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::models::{
    Book, Chapter, Health, Scripture, ScriptureResponse, ScriptureSearch, Verse, Volume,
    VolumeCount,
};

/// The remote scripture API. One method per endpoint, one request per call.
#[async_trait]
pub trait ScriptureApi: Send + Sync {
    async fn get_volumes(&self) -> Result<Vec<Volume>>;

    async fn get_books_by_volume(&self, volume_id: i64) -> Result<Vec<Book>>;

    async fn get_chapters_by_book(&self, book_id: i64) -> Result<Vec<Chapter>>;

    /// Verses come back ordered by verse number.
    async fn get_verses_by_chapter(&self, chapter_id: i64) -> Result<Vec<Verse>>;

    async fn search_scriptures(&self, search: &ScriptureSearch) -> Result<ScriptureResponse>;

    /// Match counts for every volume, zero counts included.
    async fn get_search_volume_counts(&self, query: &str) -> Result<Vec<VolumeCount>>;

    async fn get_scripture_by_reference(
        &self,
        book_title: &str,
        chapter: i32,
        verse: Option<i32>,
    ) -> Result<Vec<Scripture>>;

    async fn get_random_scripture(&self) -> Result<Scripture>;

    async fn health_check(&self) -> Result<Health>;
}

/// FastAPI error payload.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct HttpScriptureApi {
    client: Client,
    base_url: Url,
}

impl HttpScriptureApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client. With `timeout` unset a hung request waits forever.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{} ({})", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        parsed.set_query(None);
        parsed.set_fragment(None);

        let mut builder =
            Client::builder().user_agent(concat!("fast-scriptures/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| ApiError::Transport {
            url: parsed.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments (percent-encoded) and query pairs to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        // The constructor rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let url_text = url.to_string();
        debug!(url = %url_text, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url_text.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: url_text.clone(),
                source,
            })?;

        if !status.is_success() {
            let detail = error_detail(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            warn!(url = %url_text, status = status.as_u16(), %detail, "request failed");
            return Err(ApiError::Status {
                url: url_text,
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            warn!(url = %url_text, error = %source, "malformed response");
            ApiError::Decode {
                url: url_text,
                source,
            }
        })
    }
}

/// Pull a readable message out of an error body.
fn error_detail(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(match parsed.detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(200).collect())
    }
}

#[async_trait]
impl ScriptureApi for HttpScriptureApi {
    async fn get_volumes(&self) -> Result<Vec<Volume>> {
        let url = self.endpoint(&["api", "scriptures", "volumes"], &[]);
        self.get_json(url).await
    }

    async fn get_books_by_volume(&self, volume_id: i64) -> Result<Vec<Book>> {
        let id = volume_id.to_string();
        let url = self.endpoint(&["api", "scriptures", "volumes", &id, "books"], &[]);
        self.get_json(url).await
    }

    async fn get_chapters_by_book(&self, book_id: i64) -> Result<Vec<Chapter>> {
        let id = book_id.to_string();
        let url = self.endpoint(&["api", "scriptures", "books", &id, "chapters"], &[]);
        self.get_json(url).await
    }

    async fn get_verses_by_chapter(&self, chapter_id: i64) -> Result<Vec<Verse>> {
        let id = chapter_id.to_string();
        let url = self.endpoint(&["api", "scriptures", "chapters", &id, "verses"], &[]);
        self.get_json(url).await
    }

    async fn search_scriptures(&self, search: &ScriptureSearch) -> Result<ScriptureResponse> {
        let url = self.endpoint(&["api", "scriptures", "search"], &search_params(search));
        self.get_json(url).await
    }

    async fn get_search_volume_counts(&self, query: &str) -> Result<Vec<VolumeCount>> {
        let url = self.endpoint(
            &["api", "scriptures", "search", "volumes"],
            &[("q", query.to_string())],
        );
        self.get_json(url).await
    }

    async fn get_scripture_by_reference(
        &self,
        book_title: &str,
        chapter: i32,
        verse: Option<i32>,
    ) -> Result<Vec<Scripture>> {
        let chapter = chapter.to_string();
        let query: Vec<(&str, String)> = verse.map(|v| ("verse", v.to_string())).into_iter().collect();
        let url = self.endpoint(
            &["api", "scriptures", "reference", book_title, &chapter],
            &query,
        );
        self.get_json(url).await
    }

    async fn get_random_scripture(&self) -> Result<Scripture> {
        let url = self.endpoint(
            &["api", "scriptures", "random"],
            &[("include_lds", "true".to_string())],
        );
        self.get_json(url).await
    }

    async fn health_check(&self) -> Result<Health> {
        let url = self.endpoint(&["health"], &[]);
        self.get_json(url).await
    }
}

fn search_params(search: &ScriptureSearch) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", search.query.clone()),
        ("limit", search.limit.to_string()),
        ("offset", search.offset.to_string()),
    ];
    if let Some(volume_id) = search.volume_id {
        params.push(("volume_id", volume_id.to_string()));
    }
    params
}
