//! Aggregated book records and the key used to merge them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when no catalog supplied one.
pub const UNTITLED: &str = "Untitled";

/// Catalog a record came from.
///
/// The declaration order is the default merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Full-text catalog (Project Gutenberg).
    Text,
    /// Audiobook catalog (LibriVox).
    Audio,
    /// General bibliographic catalog (Open Library).
    Bibliographic,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::Audio => "audio",
            SourceKind::Bibliographic => "bibliographic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Downloadable text formats for a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
}

impl TextUrls {
    /// True when at least one format has a non-blank URL.
    pub fn any(&self) -> bool {
        [&self.html, &self.epub, &self.pdf].into_iter().any(|u| is_present(u))
    }

    /// Fill every unset format from `other`, keeping formats already set.
    pub fn fill_from(&mut self, other: &TextUrls) {
        fill(&mut self.html, &other.html);
        fill(&mut self.epub, &other.epub);
        fill(&mut self.pdf, &other.pdf);
    }
}

/// Where a reader should open a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderTarget {
    /// HTML or PDF, displayable in an embedded reader.
    InApp(String),
    /// EPUB only, handed to the system default handler.
    External(String),
}

/// Unified book entity after the cross-catalog merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: TextUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
    /// Catalogs that contributed to this record, in merge order.
    #[serde(default)]
    pub sources: Vec<SourceKind>,
}

impl AggregatedRecord {
    /// Create an empty record with the given title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            text: TextUrls::default(),
            audio_url: None,
            cover_url: None,
            language: None,
            first_publish_year: None,
            sources: Vec::new(),
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.any()
    }

    pub fn has_audio(&self) -> bool {
        is_present(&self.audio_url)
    }

    /// Merge key of this record, shared with favorites.
    pub fn key(&self) -> String {
        normalized_key(&self.title, &self.author)
    }

    /// Preferred reading URL: HTML, then PDF, then EPUB.
    pub fn reader_target(&self) -> Option<ReaderTarget> {
        if let Some(url) = present(&self.text.html).or_else(|| present(&self.text.pdf)) {
            return Some(ReaderTarget::InApp(url.to_string()));
        }
        present(&self.text.epub).map(|url| ReaderTarget::External(url.to_string()))
    }
}

/// Merge key: `lowercase(trim(title)) + "|" + lowercase(trim(author))`.
pub fn normalized_key(title: &str, author: &str) -> String {
    format!("{}|{}", title.trim().to_lowercase(), author.trim().to_lowercase())
}

/// Sort records by text availability, then audio availability, then title.
pub fn rank(records: &mut [AggregatedRecord]) {
    records.sort_by(|a, b| {
        b.has_text()
            .cmp(&a.has_text())
            .then_with(|| b.has_audio().cmp(&a.has_audio()))
            .then_with(|| a.title.cmp(&b.title))
    });
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn is_present(value: &Option<String>) -> bool {
    present(value).is_some()
}

fn fill(slot: &mut Option<String>, candidate: &Option<String>) {
    if !is_present(slot)
        && let Some(value) = present(candidate)
    {
        *slot = Some(value.to_string());
    }
}
