use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};
use scriptures_core::{Highlighter, ReaderShell, Scripture, TreeNode, ViewMode};

use crate::app::{App, FocusPane, InputMode};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray })
}

fn selected_style() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Split text into spans, marking query matches.
fn highlighted_spans<'a>(highlighter: &Highlighter, text: &'a str, base: Style) -> Vec<Span<'a>> {
    highlighter
        .segments(text)
        .into_iter()
        .map(|segment| {
            if segment.matched {
                Span::styled(segment.text, base.bg(Color::Yellow).fg(Color::Black).bold())
            } else {
                Span::styled(segment.text, base)
            }
        })
        .collect()
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let banner_height = u16::from(app.store.error().is_some());

    let [header_area, banner_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    if let Some(message) = app.store.error() {
        render_error_banner(message, frame, banner_area);
    }

    let [nav_area, content_area] =
        Layout::horizontal([Constraint::Length(32), Constraint::Min(0)]).areas(body_area);
    render_navigation(app, frame, nav_area);
    match app.shell.view_mode() {
        ViewMode::Navigation => render_reader(app, frame, content_area),
        ViewMode::Search => render_search(app, frame, content_area),
        ViewMode::Random => render_random(app, frame, content_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let loading = if app.store.loading() {
        format!(" {} loading", SPINNER[app.animation_frame as usize % SPINNER.len()])
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Fast Scriptures ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(loading, Style::default().fg(Color::Yellow)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_error_banner(message: &str, frame: &mut Frame, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", message), Style::default().fg(Color::White)),
        Span::styled(" x ", Style::default().bg(Color::White).fg(Color::Red)),
        Span::raw(" dismiss"),
    ]))
    .style(Style::default().bg(Color::Red));
    frame.render_widget(banner, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = format!(" {} ", app.shell.view_mode().label());

    // Dark background with bright text reads on both light and dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.input_mode == InputMode::Editing {
        hints.extend(hint("Enter", "search"));
        hints.extend(hint("Esc", "cancel"));
    } else {
        match (app.focus, app.shell.view_mode()) {
            (FocusPane::Navigation, _) => {
                hints.extend(hint("j/k", "nav"));
                hints.extend(hint("Enter", "open"));
                hints.extend(hint("a", "all volumes"));
            }
            (FocusPane::Content, ViewMode::Navigation) => {
                hints.extend(hint("j/k", "verse"));
                hints.extend(hint("Space", "mark"));
                hints.extend(hint("[ ]", "chapter"));
            }
            (FocusPane::Content, ViewMode::Search) => {
                hints.extend(hint("j/k", "results"));
                hints.extend(hint("Enter", "view"));
                hints.extend(hint("1-9", "volume"));
                hints.extend(hint("0", "all"));
            }
            (FocusPane::Content, ViewMode::Random) => {}
        }
        hints.extend(hint("Tab", "focus"));
        hints.extend(hint("/", "search"));
        hints.extend(hint("r", "random"));
        hints.extend(hint("b", "read"));
        hints.extend(hint("q", "quit"));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_navigation(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = if app.tree.show_all_volumes() {
        " All Volumes "
    } else {
        " Volumes "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Navigation))
        .title(title);

    let items: Vec<ListItem> = app
        .tree
        .nodes(&app.store)
        .into_iter()
        .map(|node| {
            let indent = "  ".repeat(node.depth());
            match node {
                TreeNode::Volume {
                    volume,
                    expanded,
                    selected,
                } => {
                    let marker = if expanded { "v" } else { ">" };
                    let mut style = Style::default().fg(Color::Cyan);
                    if selected {
                        style = style.bold();
                    }
                    ListItem::new(Line::styled(
                        format!("{}{} {}", indent, marker, volume.volume_title),
                        style,
                    ))
                }
                TreeNode::Book {
                    book,
                    expanded,
                    selected,
                } => {
                    let marker = if expanded { "v" } else { ">" };
                    let mut style = Style::default();
                    if selected {
                        style = style.bold();
                    }
                    ListItem::new(Line::styled(
                        format!("{}{} {}", indent, marker, book.book_title),
                        style,
                    ))
                }
                TreeNode::Chapter { chapter } => ListItem::new(format!(
                    "{}  Chapter {}",
                    indent, chapter.chapter_number
                )),
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(selected_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.nav_state);
}

fn render_reader(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Content))
        .title(format!(" {} ", app.content_title()));

    let Some(reader) = app.shell.reader() else {
        let placeholder = Paragraph::new("Select a chapter to start reading")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [position_area, verses_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
    app.content_height = verses_area.height;
    app.content_width = verses_area.width;

    let dim = Style::default().fg(Color::DarkGray);
    let enabled = Style::default().fg(Color::Cyan);
    let position = Line::from(vec![
        Span::styled("[ prev ", if reader.has_previous() { enabled } else { dim }),
        Span::raw(format!(" {} ", reader.position_label())),
        Span::styled(" next ]", if reader.has_next() { enabled } else { dim }),
    ]);
    frame.render_widget(Paragraph::new(position).centered(), position_area);

    let content_focused = app.focus == FocusPane::Content;
    let highlighted = reader.highlighted_verse();
    let mut lines: Vec<Line> = Vec::new();
    for (idx, verse) in app.store.verses().iter().enumerate() {
        let is_cursor = content_focused && idx == app.verse_cursor;
        let is_marked = highlighted == Some(verse.verse_number);

        let number_style = if is_cursor {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Yellow).bold()
        };
        let text_style = if is_marked {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{}  ", verse.verse_number), number_style),
            Span::styled(verse.scripture_text.as_str(), text_style),
        ]));
        // Empty line between verses
        lines.push(Line::default());
    }

    if lines.is_empty() {
        let waiting = if app.store.loading() {
            "Loading verses..."
        } else {
            "No verses"
        };
        frame.render_widget(Paragraph::new(waiting).style(dim), verses_area);
        return;
    }

    app.total_content_lines = lines.len() as u16;
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((app.content_scroll, 0));
    frame.render_widget(paragraph, verses_area);

    if app.total_content_lines > app.content_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state = ScrollbarState::new(app.total_content_lines as usize)
            .position(app.content_scroll as usize);
        frame.render_stateful_widget(scrollbar, verses_area, &mut scrollbar_state);
    }
}

fn render_search(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, counts_area, results_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Search ");
    let input = Paragraph::new(app.shell.search_query())
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((
            input_area.x + app.shell.search_query().chars().count() as u16 + 1,
            input_area.y + 1,
        ));
    }

    render_volume_counts(app, frame, counts_area);

    let highlighter = app.shell.highlighter();
    let focused = app.focus == FocusPane::Content;

    if let Some(results) = app.store.search_results() {
        let title = format!(
            " Results ({} of {}) ",
            results.scriptures.len(),
            results.total
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(title);

        if results.is_empty() {
            let empty = Paragraph::new("No matches")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, results_area);
            return;
        }

        let items: Vec<ListItem> = results
            .scriptures
            .iter()
            .map(|s| {
                ListItem::new(Text::from(vec![
                    Line::from(highlighted_spans(
                        &highlighter,
                        &s.verse_title,
                        Style::default().fg(Color::Yellow).bold(),
                    )),
                    Line::from(highlighted_spans(&highlighter, &s.scripture_text, Style::default())),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Blue))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, results_area, &mut app.results_state);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(format!(" {} ", app.content_title()));
    match app.shell.current_scripture() {
        Some(scripture) => {
            frame.render_widget(scripture_card(scripture, &highlighter).block(block), results_area)
        }
        None => {
            let hint = Paragraph::new("Press / to search")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(hint, results_area);
        }
    }
}

fn render_volume_counts(app: &App, frame: &mut Frame, area: Rect) {
    let active_volume = app
        .shell
        .volume_filter()
        .and_then(|id| app.store.volumes().iter().find(|v| v.id == id))
        .map(|v| v.volume_short_title.as_str());

    let mut spans = Vec::new();
    for (i, count) in app.store.volume_counts().iter().enumerate() {
        let style = if active_volume == Some(count.volume.as_str()) {
            selected_style()
        } else if ReaderShell::is_filter_enabled(count) {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" [{}] {} {} ", i + 1, count.volume, count.count),
            style,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn scripture_card<'a>(scripture: &'a Scripture, highlighter: &Highlighter) -> Paragraph<'a> {
    let lines = vec![
        Line::from(highlighted_spans(
            highlighter,
            &scripture.verse_title,
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::styled(
            scripture.book_long_title.as_str(),
            Style::default().fg(Color::DarkGray),
        ),
        Line::default(),
        Line::from(highlighted_spans(
            highlighter,
            &scripture.scripture_text,
            Style::default(),
        )),
    ];
    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn render_random(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Content))
        .title(format!(" {} ", app.content_title()));

    match app.shell.current_scripture() {
        Some(scripture) => {
            let card = scripture_card(scripture, &Highlighter::default()).block(block);
            frame.render_widget(card, area);
        }
        None => {
            let hint = Paragraph::new("Press r for a random verse")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(hint, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{pump, test_app};
    use ratatui::{
        backend::TestBackend,
        buffer::{Buffer, Cell},
        Terminal,
    };

    fn screen(app: &mut App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen_text(app: &mut App) -> String {
        screen(app)
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    /// Cells of the first place `needle` is drawn.
    fn find_cells<'a>(buffer: &'a Buffer, needle: &str) -> Option<&'a [Cell]> {
        let width = needle.chars().count();
        buffer.content.windows(width).find(|cells| {
            cells
                .iter()
                .map(|cell| cell.symbol())
                .eq(needle.chars().map(String::from))
        })
    }

    #[test]
    fn test_highlighted_spans_mark_matches() {
        let highlighter = Highlighter::new("faith");
        let spans = highlighted_spans(&highlighter, "Faith and faith", Style::default());
        let marked: Vec<&str> = spans
            .iter()
            .filter(|s| s.style.bg == Some(Color::Yellow))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(marked, vec!["Faith", "faith"]);
    }

    #[tokio::test]
    async fn test_search_results_mark_title_matches() {
        let (mut app, mut rx) = test_app();
        app.start_editing();
        app.shell.search_query_mut().push_str("matthew");
        app.submit_search();
        pump(&mut app, &mut rx, 1).await;

        // The second hit is not under the list cursor
        let buffer = screen(&mut app);
        let title = find_cells(&buffer, "Matthew 5:2").expect("result title drawn");
        assert!(title[..7].iter().all(|cell| cell.bg == Color::Yellow));
        assert!(title[7..].iter().all(|cell| cell.bg != Color::Yellow));
    }

    #[test]
    fn test_scripture_card_marks_title_matches() {
        let scripture = crate::app::tests::scripture(3, "Blessed are they that mourn");
        let card = scripture_card(&scripture, &Highlighter::new("matthew"));
        let mut buffer = Buffer::empty(Rect::new(0, 0, 40, 6));
        ratatui::widgets::Widget::render(card, buffer.area, &mut buffer);

        let title = find_cells(&buffer, "Matthew 5:3").expect("card title drawn");
        assert!(title[..7].iter().all(|cell| cell.bg == Color::Yellow));
        assert_eq!(title[8].bg, Color::Reset);
    }

    #[tokio::test]
    async fn test_render_random_view() {
        let (mut app, mut rx) = test_app();
        app.start();
        pump(&mut app, &mut rx, 2).await;

        let text = screen_text(&mut app);
        assert!(text.contains("Random Scripture"));
        assert!(text.contains("Matthew 5:3"));
        assert!(text.contains("OT title"));
        assert!(!text.contains("dismiss"));
    }

    #[test]
    fn test_render_empty_reader() {
        let (mut app, _rx) = test_app();
        let text = screen_text(&mut app);
        assert!(text.contains("Select a chapter to start reading"));
        assert!(text.contains("READ"));
    }
}
