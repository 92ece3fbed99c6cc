//! Records returned by the scripture API.
//!
//! These are plain values. The client stores and filters them but never
//! builds or edits one itself.

use serde::{Deserialize, Serialize};

/// Default page size for keyword search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Largest page size the API accepts.
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Volumes shown in the navigation tree when "show all" is off.
pub const DEFAULT_VOLUME_SHORT_TITLES: [&str; 2] = ["OT", "NT"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: i64,
    pub volume_title: String,
    pub volume_long_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_subtitle: Option<String>,
    pub volume_short_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_lds_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub volume_id: i64,
    pub book_title: String,
    pub book_long_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_subtitle: Option<String>,
    pub book_short_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_lds_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub book_id: i64,
    pub chapter_number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub id: i64,
    pub chapter_id: i64,
    pub verse_number: i32,
    pub scripture_text: String,
}

/// A single verse joined with its chapter, book and volume.
///
/// Returned by search, reference lookup and the random endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripture {
    pub volume_id: i64,
    pub book_id: i64,
    pub chapter_id: i64,
    pub verse_id: i64,
    pub volume_title: String,
    pub book_title: String,
    pub volume_long_title: String,
    pub book_long_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_subtitle: Option<String>,
    pub volume_short_title: String,
    pub book_short_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_lds_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_lds_url: Option<String>,
    pub chapter_number: i32,
    pub verse_number: i32,
    pub scripture_text: String,
    pub verse_title: String,
    pub verse_short_title: String,
}

/// One page of search results.
///
/// `total` counts every match on the server, independent of `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureResponse {
    pub scriptures: Vec<Scripture>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl ScriptureResponse {
    pub fn is_empty(&self) -> bool {
        self.scriptures.is_empty()
    }

    /// Whether the server has matches beyond this page.
    pub fn has_more(&self) -> bool {
        (self.offset as u64) + (self.scriptures.len() as u64) < self.total
    }
}

/// Parameters for a keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptureSearch {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
    pub volume_id: Option<i64>,
}

impl ScriptureSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
            volume_id: None,
        }
    }

    /// Set the page window. `limit` is clamped to what the API accepts.
    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        self.offset = offset;
        self
    }

    pub fn with_volume(mut self, volume_id: Option<i64>) -> Self {
        self.volume_id = volume_id;
        self
    }
}

/// Number of matches for the current query inside one volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeCount {
    /// Volume short title, e.g. "NT".
    pub volume: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}
