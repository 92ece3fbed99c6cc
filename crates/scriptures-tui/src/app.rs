use std::sync::Arc;

use ratatui::widgets::ListState;
use scriptures_core::{
    ApiError, Book, Chapter, Config, NavigationTree, ReaderShell, Request, Response,
    ScriptureApi, ScriptureStore, Ticket, TreeNode, ViewMode, Volume,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Navigation,
    Content,
}

/// Owned copy of the tree row under the cursor.
enum NodeTarget {
    Volume(Volume),
    Book(Book),
    Chapter(Chapter),
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    pub store: ScriptureStore,
    pub tree: NavigationTree,
    pub shell: ReaderShell,

    pub nav_state: ListState,
    pub results_state: ListState,
    pub verse_cursor: usize,

    // Content scrolling
    pub content_scroll: u16,
    pub content_height: u16,
    pub content_width: u16,
    pub total_content_lines: u16,

    pub animation_frame: u8,

    api: Arc<dyn ScriptureApi>,
    tx: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(api: Arc<dyn ScriptureApi>, tx: UnboundedSender<AppEvent>, config: &Config) -> Self {
        let mut nav_state = ListState::default();
        nav_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Navigation,

            store: ScriptureStore::new(),
            tree: NavigationTree::new(config.show_all_volumes),
            shell: ReaderShell::new(config.search_limit()),

            nav_state,
            results_state: ListState::default(),
            verse_cursor: 0,

            content_scroll: 0,
            content_height: 0,
            content_width: 0,
            total_content_lines: 0,

            animation_frame: 0,

            api,
            tx,
        }
    }

    /// Initial loads: the volume list and a random verse to greet with.
    pub fn start(&mut self) {
        self.dispatch(Some(Request::Volumes));
        self.dispatch(Some(Request::Random));
    }

    /// Begin a request in the store and run it on a task. The outcome comes
    /// back as [`AppEvent::Loaded`].
    pub fn dispatch(&mut self, request: Option<Request>) {
        let Some(request) = request else {
            return;
        };
        let ticket = self.store.begin(&request);
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = scriptures_core::perform(api.as_ref(), request).await;
            // The receiver is gone only once the app is shutting down.
            let _ = tx.send(AppEvent::Loaded(ticket, result));
        });
    }

    pub fn on_loaded(&mut self, ticket: Ticket, result: Result<Response, ApiError>) {
        match self.store.finish(ticket, result) {
            Some(Response::Random(scripture)) => {
                debug!(verse = %scripture.verse_title, "showing random scripture");
                self.shell.show_random(scripture, &mut self.store);
                self.results_state.select(None);
            }
            Some(other) => debug!(?other, "unclaimed response"),
            None => {}
        }
        self.clamp_selections();
    }

    fn clamp_selections(&mut self) {
        let nodes = self.tree.nodes(&self.store).len();
        match self.nav_state.selected() {
            _ if nodes == 0 => self.nav_state.select(None),
            Some(i) if i >= nodes => self.nav_state.select(Some(nodes - 1)),
            None => self.nav_state.select(Some(0)),
            Some(_) => {}
        }

        let results = self.result_count();
        match self.results_state.selected() {
            _ if results == 0 => self.results_state.select(None),
            Some(i) if i >= results => self.results_state.select(Some(results - 1)),
            None => self.results_state.select(Some(0)),
            Some(_) => {}
        }

        let verses = self.store.verses().len();
        if self.verse_cursor >= verses {
            self.verse_cursor = verses.saturating_sub(1);
        }
    }

    fn result_count(&self) -> usize {
        self.store
            .search_results()
            .map_or(0, |results| results.scriptures.len())
    }

    // Navigation tree
    pub fn nav_len(&self) -> usize {
        self.tree.nodes(&self.store).len()
    }

    pub fn nav_down(&mut self) {
        let len = self.nav_len();
        if len > 0 {
            let i = self.nav_state.selected().unwrap_or(0);
            self.nav_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn nav_up(&mut self) {
        let i = self.nav_state.selected().unwrap_or(0);
        self.nav_state.select(Some(i.saturating_sub(1)));
    }

    fn selected_target(&self) -> Option<NodeTarget> {
        let index = self.nav_state.selected()?;
        let nodes = self.tree.nodes(&self.store);
        let target = match nodes.get(index)? {
            TreeNode::Volume { volume, .. } => NodeTarget::Volume((*volume).clone()),
            TreeNode::Book { book, .. } => NodeTarget::Book((*book).clone()),
            TreeNode::Chapter { chapter } => NodeTarget::Chapter((*chapter).clone()),
        };
        Some(target)
    }

    /// Expand/collapse the row under the cursor, or open it if it is a chapter.
    pub fn nav_enter(&mut self) {
        match self.selected_target() {
            Some(NodeTarget::Volume(volume)) => {
                let request = self.tree.toggle_volume(&volume);
                self.dispatch(request);
            }
            Some(NodeTarget::Book(book)) => {
                let request = self.tree.toggle_book(&book);
                self.dispatch(request);
            }
            Some(NodeTarget::Chapter(chapter)) => {
                let Some(selection) = self.tree.select_chapter(&chapter, self.store.chapters())
                else {
                    return;
                };
                let request = self.shell.select_chapter(selection, &mut self.store);
                self.after_chapter_change(request);
                self.focus = FocusPane::Content;
            }
            None => {}
        }
        self.clamp_selections();
    }

    pub fn toggle_show_all_volumes(&mut self) {
        self.tree.toggle_show_all_volumes();
        self.clamp_selections();
    }

    // Chapter reader
    pub fn previous_chapter(&mut self) {
        let request = self.shell.previous_chapter(&mut self.store);
        self.after_chapter_change(request);
    }

    pub fn next_chapter(&mut self) {
        let request = self.shell.next_chapter(&mut self.store);
        self.after_chapter_change(request);
    }

    fn after_chapter_change(&mut self, request: Option<Request>) {
        if request.is_some() {
            self.verse_cursor = 0;
            self.content_scroll = 0;
        }
        self.dispatch(request);
    }

    pub fn verse_down(&mut self) {
        let len = self.store.verses().len();
        if len > 0 {
            self.verse_cursor = (self.verse_cursor + 1).min(len - 1);
            self.scroll_to_cursor();
        }
    }

    pub fn verse_up(&mut self) {
        self.verse_cursor = self.verse_cursor.saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn toggle_verse(&mut self) {
        let Some(verse_number) = self.store.verses().get(self.verse_cursor).map(|v| v.verse_number)
        else {
            return;
        };
        if let Some(reader) = self.shell.reader_mut() {
            reader.toggle_verse(verse_number);
        }
    }

    /// Keep the cursor verse inside the viewport. Wrapping is estimated from
    /// the width of the last drawn verses area.
    fn scroll_to_cursor(&mut self) {
        let wrap_width = usize::from(self.content_width.max(1));
        let mut start = 0u16;
        for (i, verse) in self.store.verses().iter().enumerate() {
            // verse number prefix plus text
            let width = verse.verse_number.to_string().len() + 2 + verse.scripture_text.chars().count();
            let end = start + width.div_ceil(wrap_width).max(1) as u16;
            if i == self.verse_cursor {
                if start < self.content_scroll {
                    self.content_scroll = start;
                } else if end > self.content_scroll + self.content_height {
                    self.content_scroll = end.saturating_sub(self.content_height);
                }
                break;
            }
            // blank line between verses
            start = end + 1;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.content_scroll < self.total_content_lines.saturating_sub(self.content_height) {
            self.content_scroll = self.content_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    // Search
    pub fn start_editing(&mut self) {
        self.input_mode = InputMode::Editing;
        self.shell.set_view_mode(ViewMode::Search);
    }

    pub fn submit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let request = self.shell.submit_search();
        if request.is_some() {
            self.results_state.select(None);
            self.focus = FocusPane::Content;
        }
        self.dispatch(request);
    }

    /// Filter by the n-th volume count (1-based, as typed).
    pub fn filter_by_count(&mut self, position: usize) {
        let Some(count) = position
            .checked_sub(1)
            .and_then(|i| self.store.volume_counts().get(i))
        else {
            return;
        };
        let short_title = count.volume.clone();
        let request = self.shell.filter_by_volume(&short_title, &self.store);
        if request.is_some() {
            self.results_state.select(None);
        }
        self.dispatch(request);
    }

    pub fn clear_volume_filter(&mut self) {
        let request = self.shell.clear_volume_filter();
        self.dispatch(request);
    }

    pub fn results_down(&mut self) {
        let len = self.result_count();
        if len > 0 {
            let i = self.results_state.selected().unwrap_or(0);
            self.results_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn results_up(&mut self) {
        let i = self.results_state.selected().unwrap_or(0);
        self.results_state.select(Some(i.saturating_sub(1)));
    }

    pub fn open_result(&mut self) {
        let Some(scripture) = self.results_state.selected().and_then(|i| {
            self.store
                .search_results()
                .and_then(|results| results.scriptures.get(i).cloned())
        }) else {
            return;
        };
        self.shell.select_result(scripture, &mut self.store);
        self.results_state.select(None);
    }

    // Random
    pub fn request_random(&mut self) {
        self.dispatch(Some(Request::Random));
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.shell.set_view_mode(mode);
    }

    pub fn dismiss_error(&mut self) {
        self.store.clear_error();
    }

    pub fn tick_animation(&mut self) {
        if self.store.loading() {
            self.animation_frame = (self.animation_frame + 1) % 4;
        }
    }

    // Title helpers
    pub fn content_title(&self) -> String {
        match self.shell.view_mode() {
            ViewMode::Navigation => self
                .shell
                .reader()
                .map(|reader| reader.selection().title())
                .unwrap_or_else(|| "Select a chapter".to_string()),
            ViewMode::Search => match self.shell.submitted_query() {
                Some(query) => format!("Search: {}", query),
                None => "Search".to_string(),
            },
            ViewMode::Random => "Random Scripture".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use scriptures_core::{
        Health, Scripture, ScriptureResponse, ScriptureSearch, Verse, VolumeCount,
    };
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    type ApiResult<T> = Result<T, ApiError>;

    /// Two volumes, one book with three chapters, one verse per chapter.
    pub(crate) struct StubApi;

    pub(crate) fn volume(id: i64, short: &str) -> Volume {
        Volume {
            id,
            volume_title: format!("{} title", short),
            volume_long_title: format!("{} long title", short),
            volume_subtitle: None,
            volume_short_title: short.to_string(),
            volume_lds_url: None,
        }
    }

    pub(crate) fn scripture(verse_id: i64, text: &str) -> Scripture {
        Scripture {
            volume_id: 2,
            book_id: 40,
            chapter_id: 401,
            verse_id,
            volume_title: "New Testament".into(),
            book_title: "Matthew".into(),
            volume_long_title: "The New Testament".into(),
            book_long_title: "The Gospel According to St Matthew".into(),
            volume_subtitle: None,
            book_subtitle: None,
            volume_short_title: "NT".into(),
            book_short_title: "Matt.".into(),
            volume_lds_url: None,
            book_lds_url: None,
            chapter_number: 5,
            verse_number: verse_id as i32,
            scripture_text: text.into(),
            verse_title: format!("Matthew 5:{}", verse_id),
            verse_short_title: format!("Matt. 5:{}", verse_id),
        }
    }

    #[async_trait]
    impl ScriptureApi for StubApi {
        async fn get_volumes(&self) -> ApiResult<Vec<Volume>> {
            Ok(vec![volume(1, "OT"), volume(2, "NT")])
        }

        async fn get_books_by_volume(&self, volume_id: i64) -> ApiResult<Vec<Book>> {
            Ok(vec![Book {
                id: 1,
                volume_id,
                book_title: "Genesis".into(),
                book_long_title: "The First Book of Moses called Genesis".into(),
                book_subtitle: None,
                book_short_title: "Gen.".into(),
                book_lds_url: None,
            }])
        }

        async fn get_chapters_by_book(&self, book_id: i64) -> ApiResult<Vec<Chapter>> {
            Ok((1..=3)
                .map(|n| Chapter {
                    id: 10 + n as i64,
                    book_id,
                    chapter_number: n,
                })
                .collect())
        }

        async fn get_verses_by_chapter(&self, chapter_id: i64) -> ApiResult<Vec<Verse>> {
            Ok(vec![Verse {
                id: chapter_id * 100,
                chapter_id,
                verse_number: 1,
                scripture_text: format!("First verse of chapter {}", chapter_id),
            }])
        }

        async fn search_scriptures(&self, search: &ScriptureSearch) -> ApiResult<ScriptureResponse> {
            let scriptures = vec![scripture(1, "Blessed are the meek"), scripture(2, "Blessed are the poor")];
            Ok(ScriptureResponse {
                total: scriptures.len() as u64,
                scriptures,
                limit: search.limit,
                offset: search.offset,
            })
        }

        async fn get_search_volume_counts(&self, _query: &str) -> ApiResult<Vec<VolumeCount>> {
            Ok(vec![
                VolumeCount {
                    volume: "OT".into(),
                    count: 0,
                },
                VolumeCount {
                    volume: "NT".into(),
                    count: 2,
                },
            ])
        }

        async fn get_scripture_by_reference(
            &self,
            _book_title: &str,
            _chapter: i32,
            _verse: Option<i32>,
        ) -> ApiResult<Vec<Scripture>> {
            Ok(Vec::new())
        }

        async fn get_random_scripture(&self) -> ApiResult<Scripture> {
            Ok(scripture(3, "Blessed are they that mourn"))
        }

        async fn health_check(&self) -> ApiResult<Health> {
            Ok(Health {
                status: "ok".into(),
            })
        }
    }

    pub(crate) fn test_app() -> (App, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(Arc::new(StubApi), tx, &Config::default());
        (app, rx)
    }

    /// Feed `count` completions back into the app.
    pub(crate) async fn pump(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>, count: usize) {
        for _ in 0..count {
            match rx.recv().await {
                Some(AppEvent::Loaded(ticket, result)) => app.on_loaded(ticket, result),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_start_loads_volumes_and_random() {
        let (mut app, mut rx) = test_app();
        app.start();
        assert!(app.store.loading());

        pump(&mut app, &mut rx, 2).await;

        assert_eq!(app.store.volumes().len(), 2);
        assert!(!app.store.loading());
        assert_eq!(app.shell.view_mode(), ViewMode::Random);
        assert!(app.shell.current_scripture().is_some());
        assert_eq!(app.nav_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_browse_to_chapter_and_step_forward() {
        let (mut app, mut rx) = test_app();
        app.dispatch(Some(Request::Volumes));
        pump(&mut app, &mut rx, 1).await;

        // OT -> Genesis -> chapter 1
        app.nav_enter();
        pump(&mut app, &mut rx, 1).await;
        app.nav_down();
        app.nav_enter();
        pump(&mut app, &mut rx, 1).await;
        app.nav_down();
        app.nav_enter();
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.shell.view_mode(), ViewMode::Navigation);
        assert_eq!(app.focus, FocusPane::Content);
        assert_eq!(app.content_title(), "Genesis 1");
        assert_eq!(app.store.verses()[0].chapter_id, 11);

        app.next_chapter();
        pump(&mut app, &mut rx, 1).await;
        assert_eq!(app.content_title(), "Genesis 2");
        assert_eq!(app.store.verses()[0].chapter_id, 12);
    }

    #[tokio::test]
    async fn test_search_then_filter_refuses_empty_volume() {
        let (mut app, mut rx) = test_app();
        app.dispatch(Some(Request::Volumes));
        pump(&mut app, &mut rx, 1).await;

        app.start_editing();
        app.shell.search_query_mut().push_str("blessed");
        app.submit_search();
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.results_state.selected(), Some(0));
        app.filter_by_count(1);
        assert!(!app.store.loading());
        assert_eq!(app.shell.volume_filter(), None);

        app.filter_by_count(2);
        assert!(app.store.loading());
        pump(&mut app, &mut rx, 1).await;
        assert_eq!(app.shell.volume_filter(), Some(2));
    }

    #[tokio::test]
    async fn test_open_result_clears_list() {
        let (mut app, mut rx) = test_app();
        app.start_editing();
        app.shell.search_query_mut().push_str("blessed");
        app.submit_search();
        pump(&mut app, &mut rx, 1).await;

        app.results_down();
        app.open_result();

        assert!(app.store.search_results().is_none());
        assert_eq!(
            app.shell.current_scripture().map(|s| s.verse_id),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_random_reply_does_not_hide_newer_search() {
        let (mut app, mut rx) = test_app();
        app.request_random();
        app.start_editing();
        app.shell.search_query_mut().push_str("blessed");
        app.submit_search();

        pump(&mut app, &mut rx, 2).await;

        assert_eq!(app.shell.view_mode(), ViewMode::Search);
        assert_eq!(
            app.store.search_results().map(|r| r.scriptures.len()),
            Some(2)
        );
        assert!(app.shell.current_scripture().is_none());
        assert!(!app.store.loading());
    }

    fn long_verses(app: &mut App, count: i32) {
        let ticket = app.store.begin(&Request::Verses { chapter_id: 11 });
        let verses = (1..=count)
            .map(|n| Verse {
                id: n as i64,
                chapter_id: 11,
                verse_number: n,
                scripture_text: "x".repeat(77),
            })
            .collect();
        app.store.finish(ticket, Ok(Response::Verses(verses)));
    }

    #[test]
    fn test_scroll_follows_cursor_at_drawn_width() {
        let (mut app, _rx) = test_app();
        long_verses(&mut app, 3);
        // "1  " plus 77 chars wraps to 2 rows at width 40, 1 row at width 80
        app.content_height = 4;

        app.content_width = 40;
        app.verse_down();
        assert_eq!(app.verse_cursor, 1);
        // verse 2 spans rows 3..5
        assert_eq!(app.content_scroll, 1);

        app.content_scroll = 0;
        app.verse_cursor = 0;
        app.content_width = 80;
        app.verse_down();
        assert_eq!(app.content_scroll, 0);
    }

    #[test]
    fn test_toggle_verse_without_reader_is_noop() {
        let (mut app, _rx) = test_app();
        app.toggle_verse();
        assert!(app.shell.reader().is_none());
    }
}
