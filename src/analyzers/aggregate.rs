use crate::analyzers::types::{AnalysisResult, RawTrackEntry, TrackRecord};
use crate::analyzers::utility::truncated_mean;
use std::collections::HashSet;
use tracing::debug;

/// Aggregates an ordered batch of catalog entries into an [`AnalysisResult`].
///
/// Entries without a popularity score are skipped. Every other entry becomes
/// a [`TrackRecord`] whose position is its 1-based rank among the kept
/// entries. An entry is flagged as a duplicate when an earlier entry carried
/// the same identifier; entries without an identifier never take part in
/// duplicate detection.
///
/// Scores are passed through unchanged, including values outside 0-100.
pub fn analyze(entries: &[RawTrackEntry]) -> AnalysisResult {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for entry in entries {
        let Some(score) = entry.popularity else {
            skipped += 1;
            continue;
        };

        // insert() is false when the id was already present
        let is_duplicate = match entry.usable_id() {
            Some(id) => !seen.insert(id),
            None => false,
        };

        records.push(TrackRecord {
            position: records.len() + 1,
            name: entry.name.clone(),
            artist: entry.artist.clone(),
            score,
            is_duplicate,
        });
    }

    let scores: Vec<i32> = records.iter().map(|r| r.score).collect();
    let duplicate_count = records.iter().filter(|r| r.is_duplicate).count();

    debug!(
        tracks = records.len(),
        skipped,
        duplicates = duplicate_count,
        "Batch aggregated"
    );

    AnalysisResult {
        average_score: truncated_mean(&scores),
        track_count: records.len(),
        duplicate_count,
        records,
    }
}
