//! The scripture data store.
//!
//! `ScriptureStore` is the single owner of fetched data and of the shared
//! `loading` / `error` flags. Every action follows the same contract: mark
//! loading, clear the error, perform one API call, store the result (or the
//! error message), then clear loading.
//!
//! Actions come in two shapes. The async methods (`fetch_volumes`,
//! `search_scriptures`, ...) run the whole cycle in place. A UI that must not
//! block uses the split form instead: [`ScriptureStore::begin`] hands out a
//! [`Ticket`], the request runs elsewhere through [`perform`], and
//! [`ScriptureStore::finish`] applies the outcome.
//!
//! A response is dropped when a newer request of the same kind was issued
//! after it, so a slow reply never overwrites a fresher one.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::api::ScriptureApi;
use crate::error::Result;
use crate::models::{
    Book, Chapter, Scripture, ScriptureResponse, ScriptureSearch, Verse, Volume, VolumeCount,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Volumes,
    Books { volume_id: i64 },
    Chapters { book_id: i64 },
    Verses { chapter_id: i64 },
    Search(ScriptureSearch),
    Reference {
        book_title: String,
        chapter: i32,
        verse: Option<i32>,
    },
    Random,
}

impl Request {
    fn slot(&self) -> Slot {
        match self {
            Request::Volumes => Slot::Volumes,
            Request::Books { .. } => Slot::Books,
            Request::Chapters { .. } => Slot::Chapters,
            Request::Verses { .. } => Slot::Verses,
            Request::Search(_) => Slot::Search,
            Request::Reference { .. } => Slot::Reference,
            Request::Random => Slot::Random,
        }
    }

    /// Random fetches never touch the shared loading flag.
    pub fn tracks_loading(&self) -> bool {
        !matches!(self, Request::Random)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Volumes(Vec<Volume>),
    Books(Vec<Book>),
    Chapters(Vec<Chapter>),
    Verses(Vec<Verse>),
    Search {
        results: ScriptureResponse,
        counts: Vec<VolumeCount>,
    },
    Reference(Vec<Scripture>),
    Random(Scripture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Volumes,
    Books,
    Chapters,
    Verses,
    Search,
    Reference,
    Random,
}

impl Slot {
    fn failure_message(self) -> &'static str {
        match self {
            Slot::Volumes => "Failed to fetch volumes",
            Slot::Books => "Failed to fetch books",
            Slot::Chapters => "Failed to fetch chapters",
            Slot::Verses => "Failed to fetch verses",
            Slot::Search => "Failed to search scriptures",
            Slot::Reference => "Failed to fetch scripture",
            Slot::Random => "Failed to fetch random scripture",
        }
    }
}

/// Issued by [`ScriptureStore::begin`], redeemed by [`ScriptureStore::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slot: Slot,
    serial: u64,
    tracks_loading: bool,
}

/// Run one request against the API. Search also fetches the per-volume
/// counts for the same query text.
pub async fn perform<A: ScriptureApi + ?Sized>(api: &A, request: Request) -> Result<Response> {
    match request {
        Request::Volumes => api.get_volumes().await.map(Response::Volumes),
        Request::Books { volume_id } => api
            .get_books_by_volume(volume_id)
            .await
            .map(Response::Books),
        Request::Chapters { book_id } => api
            .get_chapters_by_book(book_id)
            .await
            .map(Response::Chapters),
        Request::Verses { chapter_id } => api
            .get_verses_by_chapter(chapter_id)
            .await
            .map(Response::Verses),
        Request::Search(search) => {
            let results = api.search_scriptures(&search).await?;
            let counts = api.get_search_volume_counts(&search.query).await?;
            Ok(Response::Search { results, counts })
        }
        Request::Reference {
            book_title,
            chapter,
            verse,
        } => api
            .get_scripture_by_reference(&book_title, chapter, verse)
            .await
            .map(Response::Reference),
        Request::Random => api.get_random_scripture().await.map(Response::Random),
    }
}

#[derive(Debug, Default)]
pub struct ScriptureStore {
    volumes: Vec<Volume>,
    books: Vec<Book>,
    chapters: Vec<Chapter>,
    verses: Vec<Verse>,
    search_results: Option<ScriptureResponse>,
    volume_counts: Vec<VolumeCount>,
    error: Option<String>,

    in_flight: usize,
    next_serial: u64,
    latest: HashMap<Slot, u64>,
}

impl ScriptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Books of the most recently expanded volume.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Chapters of the most recently expanded book.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn search_results(&self) -> Option<&ScriptureResponse> {
        self.search_results.as_ref()
    }

    pub fn volume_counts(&self) -> &[VolumeCount] {
        &self.volume_counts
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn volume_by_short_title(&self, short_title: &str) -> Option<&Volume> {
        self.volumes
            .iter()
            .find(|v| v.volume_short_title == short_title)
    }

    pub fn volume_count(&self, short_title: &str) -> Option<&VolumeCount> {
        self.volume_counts.iter().find(|c| c.volume == short_title)
    }

    /// The loaded chapters that belong to `book_id`, in server order.
    pub fn chapters_of_book(&self, book_id: i64) -> Vec<Chapter> {
        self.chapters
            .iter()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drop search results and counts. A search still in flight is superseded.
    pub fn clear_search_results(&mut self) {
        self.search_results = None;
        self.volume_counts.clear();
        let serial = self.issue_serial();
        self.latest.insert(Slot::Search, serial);
    }

    /// A search or a chapter load started after `serial`.
    fn overtaken(&self, serial: u64) -> bool {
        [Slot::Search, Slot::Verses]
            .iter()
            .any(|slot| self.latest.get(slot).is_some_and(|latest| *latest > serial))
    }

    fn issue_serial(&mut self) -> u64 {
        self.next_serial += 1;
        self.next_serial
    }

    /// Start a request: clear the error, mark loading, hand out a ticket.
    pub fn begin(&mut self, request: &Request) -> Ticket {
        let slot = request.slot();
        let serial = self.issue_serial();
        self.latest.insert(slot, serial);

        let tracks_loading = request.tracks_loading();
        if tracks_loading {
            self.in_flight += 1;
        }
        self.error = None;

        debug!(?request, serial, "request started");
        Ticket {
            slot,
            serial,
            tracks_loading,
        }
    }

    /// Apply a finished request.
    ///
    /// Returns the payload of requests whose result goes to the caller
    /// instead of the store (reference lookups and random scriptures).
    pub fn finish(&mut self, ticket: Ticket, result: Result<Response>) -> Option<Response> {
        if ticket.tracks_loading {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        if self.latest.get(&ticket.slot) != Some(&ticket.serial) {
            debug!(serial = ticket.serial, slot = ?ticket.slot, "dropping superseded response");
            return None;
        }

        if ticket.slot == Slot::Random && result.is_ok() && self.overtaken(ticket.serial) {
            debug!(serial = ticket.serial, "dropping random scripture, the view moved on");
            return None;
        }

        match result {
            Ok(response) => self.apply(response),
            Err(err) => {
                let message = format!("{}: {}", ticket.slot.failure_message(), err);
                warn!(%message, "request failed");
                self.error = Some(message);
                None
            }
        }
    }

    fn apply(&mut self, response: Response) -> Option<Response> {
        match response {
            Response::Volumes(volumes) => self.volumes = volumes,
            Response::Books(books) => self.books = books,
            Response::Chapters(chapters) => self.chapters = chapters,
            Response::Verses(verses) => self.verses = verses,
            Response::Search { results, counts } => {
                self.search_results = Some(results);
                self.volume_counts = counts;
            }
            other @ (Response::Reference(_) | Response::Random(_)) => return Some(other),
        }
        None
    }

    async fn run<A: ScriptureApi + ?Sized>(&mut self, api: &A, request: Request) -> Option<Response> {
        let ticket = self.begin(&request);
        let result = perform(api, request).await;
        self.finish(ticket, result)
    }

    pub async fn fetch_volumes<A: ScriptureApi + ?Sized>(&mut self, api: &A) {
        self.run(api, Request::Volumes).await;
    }

    pub async fn fetch_books_by_volume<A: ScriptureApi + ?Sized>(&mut self, api: &A, volume_id: i64) {
        self.run(api, Request::Books { volume_id }).await;
    }

    pub async fn fetch_chapters_by_book<A: ScriptureApi + ?Sized>(&mut self, api: &A, book_id: i64) {
        self.run(api, Request::Chapters { book_id }).await;
    }

    pub async fn fetch_verses_by_chapter<A: ScriptureApi + ?Sized>(
        &mut self,
        api: &A,
        chapter_id: i64,
    ) {
        self.run(api, Request::Verses { chapter_id }).await;
    }

    pub async fn search_scriptures<A: ScriptureApi + ?Sized>(
        &mut self,
        api: &A,
        search: ScriptureSearch,
    ) {
        self.run(api, Request::Search(search)).await;
    }

    /// Look up a reference. The result is returned, not stored; failures
    /// yield an empty list and set the error.
    pub async fn get_scripture_by_reference<A: ScriptureApi + ?Sized>(
        &mut self,
        api: &A,
        book_title: &str,
        chapter: i32,
        verse: Option<i32>,
    ) -> Vec<Scripture> {
        let request = Request::Reference {
            book_title: book_title.to_string(),
            chapter,
            verse,
        };
        match self.run(api, request).await {
            Some(Response::Reference(scriptures)) => scriptures,
            _ => Vec::new(),
        }
    }

    pub async fn get_random_scripture<A: ScriptureApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Option<Scripture> {
        match self.run(api, Request::Random).await {
            Some(Response::Random(scripture)) => Some(scripture),
            _ => None,
        }
    }
}
