//! Data types used by the aggregation pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single track as delivered by the catalog, before aggregation.
///
/// `popularity` is optional so that unusable entries (removed tracks, local
/// files without a score) can flow through without failing the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrackEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, deserialize_with = "lenient_popularity")]
    pub popularity: Option<i32>,
}

/// Accepts any JSON value; only integers that fit in `i32` are kept.
fn lenient_popularity<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_i64())
        .and_then(|p| i32::try_from(p).ok()))
}

impl RawTrackEntry {
    pub fn new(id: Option<&str>, name: &str, artist: &str, popularity: i32) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.to_string(),
            artist: artist.to_string(),
            popularity: Some(popularity),
        }
    }

    /// The identifier if it can take part in duplicate detection.
    /// Empty identifiers are treated as absent.
    pub(crate) fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A track after aggregation, ranked by its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub position: usize,
    pub name: String,
    pub artist: String,
    pub score: i32,
    pub is_duplicate: bool,
}

/// Summary of one batch of tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub average_score: i32,
    pub track_count: usize,
    pub duplicate_count: usize,
    pub records: Vec<TrackRecord>,
}

impl AnalysisResult {
    /// Records scoring strictly below `threshold`, in batch order.
    pub fn below_threshold(&self, threshold: i32) -> Vec<&TrackRecord> {
        self.records
            .iter()
            .filter(|r| r.score < threshold)
            .collect()
    }
}
