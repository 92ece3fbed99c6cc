//! Marks occurrences of the search query inside displayed text.
//!
//! Matching here is cosmetic only; the server decides what matches.

use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Case-insensitive literal matcher for one query.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// A blank query produces a highlighter that never matches.
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self::default();
        }
        // Escaped, so the build cannot fail on user input.
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .ok();
        Self { pattern }
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let Some(pattern) = &self.pattern else {
            return vec![Segment {
                text,
                matched: false,
            }];
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for found in pattern.find_iter(text) {
            if found.start() > last {
                segments.push(Segment {
                    text: &text[last..found.start()],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: found.as_str(),
                matched: true,
            });
            last = found.end();
        }
        if last < text.len() || segments.is_empty() {
            segments.push(Segment {
                text: &text[last..],
                matched: false,
            });
        }
        segments
    }
}

/// One-off convenience for [`Highlighter::segments`].
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    Highlighter::new(query).segments(text)
}
