use crate::models::{Book, Chapter, Volume};
use crate::store::Request;

/// A chapter picked from the tree or from previous/next.
///
/// `siblings` is the book's chapter list as it was when the pick happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSelection {
    pub volume: Volume,
    pub book: Book,
    pub chapter: Chapter,
    pub siblings: Vec<Chapter>,
}

impl ChapterSelection {
    pub fn new(volume: Volume, book: Book, chapter: Chapter, siblings: Vec<Chapter>) -> Self {
        Self {
            volume,
            book,
            chapter,
            siblings,
        }
    }

    /// e.g. "Genesis 3"
    pub fn title(&self) -> String {
        format!("{} {}", self.book.book_title, self.chapter.chapter_number)
    }

    fn with_chapter(&self, chapter: Chapter) -> Self {
        Self {
            chapter,
            ..self.clone()
        }
    }
}

#[derive(Debug)]
pub struct ChapterReader {
    selection: ChapterSelection,
    highlighted_verse: Option<i32>,
}

impl ChapterReader {
    /// Open a chapter. The returned request loads its verses.
    pub fn open(selection: ChapterSelection) -> (Self, Request) {
        let request = Request::Verses {
            chapter_id: selection.chapter.id,
        };
        let reader = Self {
            selection,
            highlighted_verse: None,
        };
        (reader, request)
    }

    /// Switch to another selection. A different chapter id re-fetches its
    /// verses and resets the highlight; the same id changes nothing else.
    pub fn show(&mut self, selection: ChapterSelection) -> Option<Request> {
        let changed = selection.chapter.id != self.selection.chapter.id;
        self.selection = selection;
        if !changed {
            return None;
        }
        self.highlighted_verse = None;
        Some(Request::Verses {
            chapter_id: self.selection.chapter.id,
        })
    }

    pub fn selection(&self) -> &ChapterSelection {
        &self.selection
    }

    pub fn highlighted_verse(&self) -> Option<i32> {
        self.highlighted_verse
    }

    /// Highlight a verse, or clear the highlight if it is already the one.
    pub fn toggle_verse(&mut self, verse_number: i32) {
        self.highlighted_verse = if self.highlighted_verse == Some(verse_number) {
            None
        } else {
            Some(verse_number)
        };
    }

    /// Index of the current chapter among its siblings, matched by id.
    pub fn position(&self) -> Option<usize> {
        let id = self.selection.chapter.id;
        self.selection.siblings.iter().position(|c| c.id == id)
    }

    pub fn has_previous(&self) -> bool {
        self.position().is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        self.position()
            .is_some_and(|i| i + 1 < self.selection.siblings.len())
    }

    pub fn previous(&self) -> Option<ChapterSelection> {
        let index = self.position()?.checked_sub(1)?;
        let chapter = self.selection.siblings.get(index)?.clone();
        Some(self.selection.with_chapter(chapter))
    }

    pub fn next(&self) -> Option<ChapterSelection> {
        let index = self.position()? + 1;
        let chapter = self.selection.siblings.get(index)?.clone();
        Some(self.selection.with_chapter(chapter))
    }

    /// "Chapter 3 of 50", or just "Chapter 3" without siblings.
    pub fn position_label(&self) -> String {
        let number = self.selection.chapter.chapter_number;
        match self.selection.siblings.len() {
            0 => format!("Chapter {}", number),
            total => format!("Chapter {} of {}", number, total),
        }
    }
}
