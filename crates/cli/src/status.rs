//! Status line shown next to the result list.

use serde::Serialize;
use std::fmt;

/// Where a search stands, rendered as a short human-readable line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SearchStatus {
    Searching,
    Found(usize),
    NoResults,
    Error(String),
    TimedOut,
}

impl SearchStatus {
    /// `Found` for a non-empty list, `NoResults` otherwise.
    pub fn for_count(count: usize) -> Self {
        if count == 0 { Self::NoResults } else { Self::Found(count) }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error(_) | Self::TimedOut)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Searching => write!(f, "Searching…"),
            Self::Found(n) => write!(f, "Found {n} items"),
            Self::NoResults => write!(f, "No results"),
            Self::Error(msg) => write!(f, "Error: {msg}"),
            Self::TimedOut => write!(f, "Search timed out"),
        }
    }
}
