//! LibriVox feed response types and normalization.

use listenup_core::SourceKind;
use serde::Deserialize;

use crate::source::{SourceRecord, non_blank};

/// Envelope of the audiobooks feed.
#[derive(Debug, Deserialize)]
pub struct LibriVoxResponse {
    #[serde(default)]
    pub books: Vec<LibriVoxBook>,
}

/// An audiobook project.
#[derive(Debug, Clone, Deserialize)]
pub struct LibriVoxBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub url_librivox: Option<String>,
    #[serde(default)]
    pub url_zip_file: Option<String>,
    #[serde(default)]
    pub url_project: Option<String>,
    #[serde(default)]
    pub url_iarchive: Option<String>,
    #[serde(default)]
    pub url_rss: Option<String>,
    #[serde(default)]
    pub totaltime: Option<String>,
    #[serde(default)]
    pub totaltimesecs: Option<u64>,
    #[serde(default)]
    pub authors: Vec<LibriVoxPerson>,
    #[serde(default)]
    pub sections: Vec<LibriVoxSection>,
    #[serde(default)]
    pub coverart: Option<LibriVoxCoverArt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibriVoxPerson {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// One recorded chapter.
#[derive(Debug, Clone, Deserialize)]
pub struct LibriVoxSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub playtime: Option<String>,
    #[serde(default)]
    pub listen_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibriVoxCoverArt {
    #[serde(default)]
    pub coverart_thumbnail: Option<String>,
    #[serde(default)]
    pub coverart_jpg: Option<String>,
    #[serde(default)]
    pub coverart_pdf: Option<String>,
}

impl LibriVoxPerson {
    /// "First Last", skipping blank parts.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<String> = [self.first_name.clone(), self.last_name.clone()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }
}

impl LibriVoxBook {
    /// First streamable section, else the bulk zip download.
    pub fn audio_url(&self) -> Option<String> {
        self.sections
            .iter()
            .find_map(|s| non_blank(s.listen_url.clone()))
            .or_else(|| non_blank(self.url_zip_file.clone()))
    }

    pub fn cover_url(&self) -> Option<String> {
        let art = self.coverart.as_ref()?;
        non_blank(art.coverart_thumbnail.clone()).or_else(|| non_blank(art.coverart_jpg.clone()))
    }
}

impl From<LibriVoxBook> for SourceRecord {
    fn from(book: LibriVoxBook) -> Self {
        SourceRecord {
            audio_url: book.audio_url(),
            cover_url: book.cover_url(),
            author: book.authors.first().and_then(LibriVoxPerson::display_name),
            title: non_blank(book.title),
            language: non_blank(book.language),
            ..SourceRecord::new(SourceKind::Audio)
        }
    }
}
