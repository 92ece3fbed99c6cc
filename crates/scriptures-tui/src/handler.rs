use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scriptures_core::ViewMode;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Loaded(ticket, result) => app.on_loaded(ticket, result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.shell.search_query_mut().pop();
        }
        KeyCode::Char(c) => {
            app.shell.search_query_mut().push(c);
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Error banner
        KeyCode::Char('x') => app.dismiss_error(),

        // View switching
        KeyCode::Char('/') | KeyCode::Char('i') => app.start_editing(),
        KeyCode::Char('s') => app.set_view(ViewMode::Search),
        KeyCode::Char('b') => app.set_view(ViewMode::Navigation),
        KeyCode::Char('r') => app.request_random(),
        KeyCode::Char('a') => app.toggle_show_all_volumes(),

        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Navigation => FocusPane::Content,
                FocusPane::Content => FocusPane::Navigation,
            };
        }

        // Chapter paging works from either pane
        KeyCode::Char('[') => app.previous_chapter(),
        KeyCode::Char(']') => app.next_chapter(),

        // Volume filter: 1-9 pick a count, 0 clears
        KeyCode::Char('0') => app.clear_volume_filter(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(position) = c.to_digit(10) {
                app.filter_by_count(position as usize);
            }
        }

        _ => match app.focus {
            FocusPane::Navigation => handle_navigation_pane(app, key),
            FocusPane::Content => handle_content_pane(app, key),
        },
    }
}

fn handle_navigation_pane(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.nav_enter(),
        _ => {}
    }
}

fn handle_content_pane(app: &mut App, key: KeyEvent) {
    let listing_results =
        app.shell.view_mode() == ViewMode::Search && app.store.search_results().is_some();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down if listing_results => app.results_down(),
        KeyCode::Char('k') | KeyCode::Up if listing_results => app.results_up(),
        KeyCode::Enter if listing_results => app.open_result(),

        KeyCode::Char('j') | KeyCode::Down => app.verse_down(),
        KeyCode::Char('k') | KeyCode::Up => app.verse_up(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_verse(),

        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.content_height / 2 {
                app.scroll_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.content_height / 2 {
                app.scroll_up();
            }
        }

        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
            app.focus = FocusPane::Navigation;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{pump, test_app};

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let (mut app, _rx) = test_app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_does_not_trigger_commands() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.shell.view_mode(), ViewMode::Search);

        for c in "quiet".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);

        assert!(!app.should_quit);
        assert_eq!(app.shell.search_query(), "quie");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_blank_search_sends_nothing() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.store.loading());
    }

    #[test]
    fn test_view_keys() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.shell.view_mode(), ViewMode::Search);
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.shell.view_mode(), ViewMode::Navigation);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Content);
    }

    #[tokio::test]
    async fn test_random_key_switches_to_random_view() {
        let (mut app, mut rx) = test_app();
        press(&mut app, KeyCode::Char('r'));
        // Random never shows the loading indicator
        assert!(!app.store.loading());

        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.shell.view_mode(), ViewMode::Random);
        assert_eq!(
            app.shell.current_scripture().map(|s| s.verse_title.as_str()),
            Some("Matthew 5:3")
        );
    }
}
