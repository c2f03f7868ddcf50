//! Gutenberg books API response types and normalization.

use listenup_core::{SourceKind, TextUrls};
use serde::Deserialize;

use crate::source::{SourceRecord, non_blank};

/// Paged envelope returned by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct GutenbergPage<T> {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// A book in the text catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct GutenbergBook {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alternative_title: Option<String>,
    #[serde(default)]
    pub authors: Vec<GutenbergAuthor>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub download_count: Option<u64>,
    #[serde(default)]
    pub gutenberg_url: Option<String>,
    #[serde(default)]
    pub formats: Vec<GutenbergFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GutenbergAuthor {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A downloadable format; `type` is a MIME type such as `application/epub+zip`.
#[derive(Debug, Clone, Deserialize)]
pub struct GutenbergFormat {
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl GutenbergBook {
    /// URL of the first format whose MIME type mentions `needle`.
    pub fn format_url(&self, needle: &str) -> Option<String> {
        self.formats
            .iter()
            .filter(|f| {
                f.mime_type
                    .as_deref()
                    .is_some_and(|t| t.to_ascii_lowercase().contains(needle))
            })
            .find_map(|f| non_blank(f.url.clone()))
    }
}

impl From<GutenbergBook> for SourceRecord {
    fn from(book: GutenbergBook) -> Self {
        let text = TextUrls {
            html: book.format_url("html"),
            epub: book.format_url("epub"),
            pdf: book.format_url("pdf"),
        };

        SourceRecord {
            title: non_blank(book.title).or_else(|| non_blank(book.alternative_title)),
            author: book.authors.into_iter().next().and_then(|a| non_blank(a.name)),
            language: non_blank(book.language),
            text,
            ..SourceRecord::new(SourceKind::Text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "next": "https://books.example/api/books?page=2",
        "previous": null,
        "results": [
            {
                "id": 1342,
                "title": "Pride and Prejudice",
                "authors": [{"id": 68, "name": "Austen, Jane"}, {"id": 9, "name": "Someone Else"}],
                "subjects": ["Courtship -- Fiction"],
                "language": "en",
                "media_type": "Text",
                "download_count": 51234,
                "formats": [
                    {"type": "image/jpeg", "url": "https://gutenberg.org/cache/1342.cover.jpg"},
                    {"type": "application/epub+zip", "url": "https://gutenberg.org/ebooks/1342.epub3.images"},
                    {"type": "application/epub+zip", "url": "https://gutenberg.org/ebooks/1342.epub.noimages"},
                    {"type": "text/html; charset=utf-8", "url": "https://gutenberg.org/ebooks/1342.html.images"}
                ],
                "copyright": false
            },
            {
                "id": 2,
                "alternative_title": "An Alternative",
                "formats": [{"type": "application/pdf", "url": null}]
            }
        ]
    }"#;

    #[test]
    fn test_deserialize_page() {
        let page: GutenbergPage<GutenbergBook> = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert!(page.next.is_some());
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, Some(1342));
        assert_eq!(page.results[0].download_count, Some(51234));
    }

    #[test]
    fn test_normalize_book() {
        let page: GutenbergPage<GutenbergBook> = serde_json::from_str(FIXTURE_JSON).unwrap();
        let record: SourceRecord = page.results[0].clone().into();

        assert_eq!(record.source, SourceKind::Text);
        assert_eq!(record.title.as_deref(), Some("Pride and Prejudice"));
        assert_eq!(record.author.as_deref(), Some("Austen, Jane"));
        assert_eq!(record.language.as_deref(), Some("en"));
        assert_eq!(record.text.epub.as_deref(), Some("https://gutenberg.org/ebooks/1342.epub3.images"));
        assert_eq!(record.text.html.as_deref(), Some("https://gutenberg.org/ebooks/1342.html.images"));
        assert!(record.text.pdf.is_none());
        assert!(record.audio_url.is_none());
        assert!(record.cover_url.is_none());
    }

    #[test]
    fn test_alternative_title_and_missing_fields() {
        let page: GutenbergPage<GutenbergBook> = serde_json::from_str(FIXTURE_JSON).unwrap();
        let record: SourceRecord = page.results[1].clone().into();

        assert_eq!(record.title.as_deref(), Some("An Alternative"));
        assert!(record.author.is_none());
        assert!(!record.text.any());
    }

    #[test]
    fn test_empty_page() {
        let page: GutenbergPage<GutenbergBook> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }
}
