//! Heading structure extraction (H1-H6)

use crate::analyzer::document::{trimmed_text, Document, Query};

const TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Non-empty heading texts per level, in document order
///
/// Counts are always derived from the lists, so a level's count can never
/// disagree with its list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headings {
    levels: [Vec<String>; 6],
}

impl Headings {
    /// Returns the heading texts for `level` (1-6); empty for any other level
    pub fn tags(&self, level: usize) -> &[String] {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the number of headings at `level` (1-6)
    pub fn count(&self, level: usize) -> usize {
        self.tags(level).len()
    }

    /// Returns the total number of headings across all levels
    pub fn total(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Appends a heading text at `level`; whitespace-only text is ignored
    pub fn push(&mut self, level: usize, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Some(list) = level.checked_sub(1).and_then(|i| self.levels.get_mut(i)) {
            list.push(text.to_string());
        }
    }
}

/// Collects the trimmed, non-empty text of every heading element
pub fn extract_headings(document: &Document) -> Headings {
    let mut headings = Headings::default();

    for (index, tag) in TAGS.iter().enumerate() {
        for element in document.find_all(&Query::tag(tag)) {
            headings.push(index + 1, &trimmed_text(&element));
        }
    }

    headings
}
