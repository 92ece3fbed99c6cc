use crate::highlight::Highlighter;
use crate::models::{Scripture, ScriptureSearch, VolumeCount, DEFAULT_SEARCH_LIMIT};
use crate::store::{Request, ScriptureStore};
use crate::views::reader::{ChapterReader, ChapterSelection};

/// Top-level display state. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Navigation,
    Search,
    Random,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Navigation => "READ",
            ViewMode::Search => "SEARCH",
            ViewMode::Random => "RANDOM",
        }
    }
}

/// Owns the view mode, the search text and the open chapter.
#[derive(Debug)]
pub struct ReaderShell {
    view_mode: ViewMode,
    search_query: String,
    submitted_query: Option<String>,
    volume_filter: Option<i64>,
    search_limit: u32,
    current_scripture: Option<Scripture>,
    reader: Option<ChapterReader>,
}

impl Default for ReaderShell {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_LIMIT)
    }
}

impl ReaderShell {
    pub fn new(search_limit: u32) -> Self {
        Self {
            view_mode: ViewMode::default(),
            search_query: String::new(),
            submitted_query: None,
            volume_filter: None,
            search_limit,
            current_scripture: None,
            reader: None,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn search_query_mut(&mut self) -> &mut String {
        &mut self.search_query
    }

    /// The query of the last search that was sent.
    pub fn submitted_query(&self) -> Option<&str> {
        self.submitted_query.as_deref()
    }

    /// Volume id the current results are restricted to.
    pub fn volume_filter(&self) -> Option<i64> {
        self.volume_filter
    }

    pub fn current_scripture(&self) -> Option<&Scripture> {
        self.current_scripture.as_ref()
    }

    pub fn reader(&self) -> Option<&ChapterReader> {
        self.reader.as_ref()
    }

    pub fn reader_mut(&mut self) -> Option<&mut ChapterReader> {
        self.reader.as_mut()
    }

    /// Route a chapter pick (tree or previous/next) into navigation mode.
    pub fn select_chapter(
        &mut self,
        selection: ChapterSelection,
        store: &mut ScriptureStore,
    ) -> Option<Request> {
        self.view_mode = ViewMode::Navigation;
        store.clear_search_results();
        match self.reader.as_mut() {
            Some(reader) => reader.show(selection),
            None => {
                let (reader, request) = ChapterReader::open(selection);
                self.reader = Some(reader);
                Some(request)
            }
        }
    }

    pub fn previous_chapter(&mut self, store: &mut ScriptureStore) -> Option<Request> {
        let selection = self.reader.as_ref()?.previous()?;
        self.select_chapter(selection, store)
    }

    pub fn next_chapter(&mut self, store: &mut ScriptureStore) -> Option<Request> {
        let selection = self.reader.as_ref()?.next()?;
        self.select_chapter(selection, store)
    }

    /// Send the typed query. Blank input is ignored.
    pub fn submit_search(&mut self) -> Option<Request> {
        let query = self.search_query.trim();
        if query.is_empty() {
            return None;
        }
        self.submitted_query = Some(query.to_string());
        self.volume_filter = None;
        self.view_mode = ViewMode::Search;
        self.search_request()
    }

    fn search_request(&self) -> Option<Request> {
        let query = self.submitted_query.as_deref()?;
        let search = ScriptureSearch::new(query)
            .with_page(self.search_limit, 0)
            .with_volume(self.volume_filter);
        Some(Request::Search(search))
    }

    /// A volume filter is offered only for volumes with matches.
    pub fn is_filter_enabled(count: &VolumeCount) -> bool {
        count.count > 0
    }

    /// Re-issue the last search restricted to one volume.
    ///
    /// Refused when the volume has no matches or is not a loaded volume.
    pub fn filter_by_volume(&mut self, short_title: &str, store: &ScriptureStore) -> Option<Request> {
        self.submitted_query.as_ref()?;
        let count = store.volume_count(short_title)?;
        if !Self::is_filter_enabled(count) {
            return None;
        }
        let volume = store.volume_by_short_title(short_title)?;
        self.volume_filter = Some(volume.id);
        self.view_mode = ViewMode::Search;
        self.search_request()
    }

    /// Re-issue the last search across all volumes.
    pub fn clear_volume_filter(&mut self) -> Option<Request> {
        self.volume_filter.take()?;
        self.search_request()
    }

    /// Show a freshly fetched random scripture.
    pub fn show_random(&mut self, scripture: Scripture, store: &mut ScriptureStore) {
        self.current_scripture = Some(scripture);
        self.view_mode = ViewMode::Random;
        store.clear_search_results();
    }

    /// Promote a search hit to the current scripture.
    pub fn select_result(&mut self, scripture: Scripture, store: &mut ScriptureStore) {
        self.current_scripture = Some(scripture);
        store.clear_search_results();
    }

    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(self.submitted_query.as_deref().unwrap_or_default())
    }
}
