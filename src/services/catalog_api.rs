//! Trait and types for interacting with a music catalog.

use crate::analyzers::types::RawTrackEntry;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user asked to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Playlist,
    Artist,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::Playlist => f.write_str("playlist"),
            AnalysisKind::Artist => f.write_str("artist"),
        }
    }
}

/// A resolved catalog entity together with its fully materialised tracks.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub kind: AnalysisKind,
    pub name: String,
    pub image_url: Option<String>,
    pub entries: Vec<RawTrackEntry>,
}

/// Abstraction over a music catalog provider (e.g., Spotify).
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// Resolves a playlist URL, URI or id and returns every track in it,
    /// across all pages.
    async fn playlist(&self, identifier: &str) -> Result<Collection>;

    /// Resolves an artist URL, URI or name and returns its top tracks.
    async fn artist_top_tracks(&self, identifier: &str) -> Result<Collection>;
}
