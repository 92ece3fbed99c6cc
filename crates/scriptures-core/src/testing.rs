//! In-memory `ScriptureApi` and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ScriptureApi;
use crate::error::{ApiError, Result};
use crate::models::{
    Book, Chapter, Health, Scripture, ScriptureResponse, ScriptureSearch, Verse, Volume,
    VolumeCount,
};

#[derive(Default)]
pub struct MockApi {
    pub volumes: Vec<Volume>,
    pub books: Vec<Book>,
    pub chapters: Vec<Chapter>,
    pub verses: Vec<Verse>,
    pub scriptures: Vec<Scripture>,
    pub counts: Vec<VolumeCount>,
    fail: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    /// Two testaments, Genesis with three chapters, Matthew with two.
    pub fn library() -> Self {
        Self {
            volumes: vec![volume(1, "OT"), volume(2, "NT"), volume(3, "BoM")],
            books: vec![
                book(1, 1, "Genesis"),
                book(2, 1, "Exodus"),
                book(40, 2, "Matthew"),
            ],
            chapters: vec![
                chapter(11, 1, 1),
                chapter(12, 1, 2),
                chapter(13, 1, 3),
                chapter(401, 40, 1),
                chapter(402, 40, 2),
            ],
            verses: vec![
                verse(1, 11, 1, "In the beginning God created the heaven and the earth."),
                verse(2, 11, 2, "And the earth was without form, and void."),
                verse(3, 13, 1, "Now the serpent was more subtil than any beast."),
            ],
            scriptures: vec![
                scripture(100, 2, "Now faith is the substance of things hoped for."),
                scripture(101, 2, "Shew me thy faith without thy works."),
                scripture(102, 2, "For by grace are ye saved through faith."),
            ],
            counts: vec![count("OT", 0), count("NT", 3), count("BoM", 0)],
            ..Default::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                url: "mock://scriptures".to_string(),
                status: 500,
                detail: "Database error: mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScriptureApi for MockApi {
    async fn get_volumes(&self) -> Result<Vec<Volume>> {
        self.record("volumes".to_string())?;
        Ok(self.volumes.clone())
    }

    async fn get_books_by_volume(&self, volume_id: i64) -> Result<Vec<Book>> {
        self.record(format!("books:{}", volume_id))?;
        Ok(self.books.iter().filter(|b| b.volume_id == volume_id).cloned().collect())
    }

    async fn get_chapters_by_book(&self, book_id: i64) -> Result<Vec<Chapter>> {
        self.record(format!("chapters:{}", book_id))?;
        Ok(self.chapters.iter().filter(|c| c.book_id == book_id).cloned().collect())
    }

    async fn get_verses_by_chapter(&self, chapter_id: i64) -> Result<Vec<Verse>> {
        self.record(format!("verses:{}", chapter_id))?;
        Ok(self.verses.iter().filter(|v| v.chapter_id == chapter_id).cloned().collect())
    }

    async fn search_scriptures(&self, search: &ScriptureSearch) -> Result<ScriptureResponse> {
        self.record(format!("search:{}:{:?}", search.query, search.volume_id))?;
        let needle = search.query.to_lowercase();
        let matches: Vec<Scripture> = self
            .scriptures
            .iter()
            .filter(|s| s.scripture_text.to_lowercase().contains(&needle))
            .filter(|s| search.volume_id.map_or(true, |id| s.volume_id == id))
            .cloned()
            .collect();
        let total = matches.len() as u64;
        let scriptures = matches
            .into_iter()
            .skip(search.offset as usize)
            .take(search.limit as usize)
            .collect();
        Ok(ScriptureResponse {
            scriptures,
            total,
            limit: search.limit,
            offset: search.offset,
        })
    }

    async fn get_search_volume_counts(&self, query: &str) -> Result<Vec<VolumeCount>> {
        self.record(format!("counts:{}", query))?;
        Ok(self.counts.clone())
    }

    async fn get_scripture_by_reference(
        &self,
        book_title: &str,
        chapter: i32,
        verse: Option<i32>,
    ) -> Result<Vec<Scripture>> {
        self.record(format!("reference:{}:{}:{:?}", book_title, chapter, verse))?;
        Ok(self
            .scriptures
            .iter()
            .filter(|s| s.book_title == book_title && s.chapter_number == chapter)
            .filter(|s| verse.map_or(true, |v| s.verse_number == v))
            .cloned()
            .collect())
    }

    async fn get_random_scripture(&self) -> Result<Scripture> {
        self.record("random".to_string())?;
        self.scriptures.first().cloned().ok_or_else(|| ApiError::Status {
            url: "mock://scriptures/random".to_string(),
            status: 404,
            detail: "No scriptures found".to_string(),
        })
    }

    async fn health_check(&self) -> Result<Health> {
        self.record("health".to_string())?;
        Ok(Health {
            status: "healthy".to_string(),
        })
    }
}

pub fn volume(id: i64, short_title: &str) -> Volume {
    Volume {
        id,
        volume_title: format!("Volume {}", short_title),
        volume_long_title: format!("The Volume {}", short_title),
        volume_subtitle: None,
        volume_short_title: short_title.to_string(),
        volume_lds_url: None,
    }
}

pub fn book(id: i64, volume_id: i64, title: &str) -> Book {
    Book {
        id,
        volume_id,
        book_title: title.to_string(),
        book_long_title: format!("The Book of {}", title),
        book_subtitle: None,
        book_short_title: title.chars().take(3).collect(),
        book_lds_url: None,
    }
}

pub fn chapter(id: i64, book_id: i64, chapter_number: i32) -> Chapter {
    Chapter {
        id,
        book_id,
        chapter_number,
    }
}

pub fn verse(id: i64, chapter_id: i64, verse_number: i32, text: &str) -> Verse {
    Verse {
        id,
        chapter_id,
        verse_number,
        scripture_text: text.to_string(),
    }
}

pub fn scripture(verse_id: i64, volume_id: i64, text: &str) -> Scripture {
    Scripture {
        volume_id,
        book_id: 58,
        chapter_id: 1100,
        verse_id,
        volume_title: "New Testament".to_string(),
        book_title: "Hebrews".to_string(),
        volume_long_title: "The New Testament".to_string(),
        book_long_title: "The Epistle of Paul the Apostle to the Hebrews".to_string(),
        volume_subtitle: None,
        book_subtitle: None,
        volume_short_title: "NT".to_string(),
        book_short_title: "Heb.".to_string(),
        volume_lds_url: None,
        book_lds_url: None,
        chapter_number: 11,
        verse_number: (verse_id - 99) as i32,
        scripture_text: text.to_string(),
        verse_title: format!("Hebrews 11:{}", verse_id - 99),
        verse_short_title: format!("Heb. 11:{}", verse_id - 99),
    }
}

pub fn count(volume: &str, count: u64) -> VolumeCount {
    VolumeCount {
        volume: volume.to_string(),
        count,
    }
}
