use std::collections::HashSet;

use crate::models::{Book, Chapter, Volume, DEFAULT_VOLUME_SHORT_TITLES};
use crate::store::{Request, ScriptureStore};
use crate::views::reader::ChapterSelection;

/// One visible row of the volume → book → chapter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNode<'a> {
    Volume {
        volume: &'a Volume,
        expanded: bool,
        selected: bool,
    },
    Book {
        book: &'a Book,
        expanded: bool,
        selected: bool,
    },
    Chapter {
        chapter: &'a Chapter,
    },
}

impl TreeNode<'_> {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Volume { .. } => 0,
            TreeNode::Book { .. } => 1,
            TreeNode::Chapter { .. } => 2,
        }
    }
}

/// Expand/collapse state of the navigation tree.
///
/// Expansion is a set, so several nodes can be open at once. Selection is a
/// single volume and a single book, tracking the most recent expand.
#[derive(Debug, Default)]
pub struct NavigationTree {
    expanded_volumes: HashSet<i64>,
    expanded_books: HashSet<i64>,
    selected_volume: Option<Volume>,
    selected_book: Option<Book>,
    show_all_volumes: bool,
}

impl NavigationTree {
    pub fn new(show_all_volumes: bool) -> Self {
        Self {
            show_all_volumes,
            ..Default::default()
        }
    }

    pub fn show_all_volumes(&self) -> bool {
        self.show_all_volumes
    }

    pub fn toggle_show_all_volumes(&mut self) {
        self.show_all_volumes = !self.show_all_volumes;
    }

    pub fn selected_volume(&self) -> Option<&Volume> {
        self.selected_volume.as_ref()
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.selected_book.as_ref()
    }

    pub fn is_volume_expanded(&self, volume_id: i64) -> bool {
        self.expanded_volumes.contains(&volume_id)
    }

    pub fn is_book_expanded(&self, book_id: i64) -> bool {
        self.expanded_books.contains(&book_id)
    }

    /// Expanding selects the volume and asks for its books. Collapsing
    /// clears both the selected volume and the selected book.
    pub fn toggle_volume(&mut self, volume: &Volume) -> Option<Request> {
        if self.expanded_volumes.remove(&volume.id) {
            self.selected_volume = None;
            self.selected_book = None;
            None
        } else {
            self.expanded_volumes.insert(volume.id);
            self.selected_volume = Some(volume.clone());
            self.selected_book = None;
            Some(Request::Books {
                volume_id: volume.id,
            })
        }
    }

    /// Expanding selects the book and asks for its chapters. Collapsing
    /// clears only the selected book.
    pub fn toggle_book(&mut self, book: &Book) -> Option<Request> {
        if self.expanded_books.remove(&book.id) {
            self.selected_book = None;
            None
        } else {
            self.expanded_books.insert(book.id);
            self.selected_book = Some(book.clone());
            Some(Request::Chapters { book_id: book.id })
        }
    }

    /// Turn a chapter pick into a selection event.
    ///
    /// Nothing is emitted unless both a volume and a book are selected.
    /// `chapters` is the loaded sibling set; only entries of the chapter's own
    /// book are kept.
    pub fn select_chapter(&self, chapter: &Chapter, chapters: &[Chapter]) -> Option<ChapterSelection> {
        let volume = self.selected_volume.as_ref()?;
        let book = self.selected_book.as_ref()?;
        let siblings = chapters
            .iter()
            .filter(|c| c.book_id == chapter.book_id)
            .cloned()
            .collect();
        Some(ChapterSelection::new(
            volume.clone(),
            book.clone(),
            chapter.clone(),
            siblings,
        ))
    }

    pub fn visible_volumes<'a>(&self, volumes: &'a [Volume]) -> Vec<&'a Volume> {
        volumes
            .iter()
            .filter(|v| {
                self.show_all_volumes
                    || DEFAULT_VOLUME_SHORT_TITLES.contains(&v.volume_short_title.as_str())
            })
            .collect()
    }

    /// Flatten the visible part of the tree, top to bottom.
    pub fn nodes<'a>(&self, store: &'a ScriptureStore) -> Vec<TreeNode<'a>> {
        let selected_volume = self.selected_volume.as_ref().map(|v| v.id);
        let selected_book = self.selected_book.as_ref().map(|b| b.id);

        let mut nodes = Vec::new();
        for volume in self.visible_volumes(store.volumes()) {
            let expanded = self.is_volume_expanded(volume.id);
            nodes.push(TreeNode::Volume {
                volume,
                expanded,
                selected: selected_volume == Some(volume.id),
            });
            if !expanded {
                continue;
            }

            for book in store.books().iter().filter(|b| b.volume_id == volume.id) {
                let expanded = self.is_book_expanded(book.id);
                nodes.push(TreeNode::Book {
                    book,
                    expanded,
                    selected: selected_book == Some(book.id),
                });
                if !expanded {
                    continue;
                }
                nodes.extend(
                    store
                        .chapters()
                        .iter()
                        .filter(|c| c.book_id == book.id)
                        .map(|chapter| TreeNode::Chapter { chapter }),
                );
            }
        }
        nodes
    }
}
