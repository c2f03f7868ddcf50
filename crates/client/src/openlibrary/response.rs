//! Open Library search and edition response types.

use listenup_core::SourceKind;
use serde::Deserialize;
use std::collections::HashMap;

use crate::source::{SourceRecord, non_blank};

/// Result of `/search.json`.
#[derive(Debug, Deserialize)]
pub struct OpenLibrarySearch {
    #[serde(default, rename = "numFound", alias = "num_found")]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<OpenLibraryDoc>,
}

/// One work in the search result.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryDoc {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub edition_key: Vec<String>,
    #[serde(default)]
    pub cover_edition_key: Option<String>,
}

/// Reference to another Open Library entity, e.g. `{"key": "/languages/eng"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryRef {
    pub key: String,
}

/// A single edition from `/books/{olid}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryEdition {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub languages: Vec<OpenLibraryRef>,
    #[serde(default)]
    pub identifiers: HashMap<String, Vec<String>>,
}

impl OpenLibraryDoc {
    /// Edition id used for cover art: first edition key, else the cover edition.
    pub fn cover_edition(&self) -> Option<String> {
        self.edition_key
            .iter()
            .find_map(|k| non_blank(Some(k.clone())))
            .or_else(|| non_blank(self.cover_edition_key.clone()))
    }

    /// Normalize into a source record, deriving the cover from `covers_base`.
    pub fn into_source_record(self, covers_base: &str) -> SourceRecord {
        let cover_url = self
            .cover_edition()
            .map(|olid| format!("{}/b/olid/{}-M.jpg", covers_base.trim_end_matches('/'), olid));

        SourceRecord {
            cover_url,
            title: non_blank(self.title),
            author: self.author_name.into_iter().next().and_then(|a| non_blank(Some(a))),
            language: self.language.into_iter().next().and_then(|l| non_blank(Some(l))),
            first_publish_year: self.first_publish_year,
            ..SourceRecord::new(SourceKind::Bibliographic)
        }
    }
}
