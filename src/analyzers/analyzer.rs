use crate::analyzers::aggregate::analyze;
use crate::analyzers::types::{AnalysisResult, TrackRecord};
use crate::config::RatingOptions;
use crate::error::{AnalyzerError, Result};
use crate::services::catalog_api::{AnalysisKind, CatalogApi, Collection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// One user action: analyze this playlist or this artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub identifier: String,
}

impl AnalysisRequest {
    pub fn new(kind: AnalysisKind, identifier: &str) -> Self {
        Self {
            kind,
            identifier: identifier.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Good,
    Poor,
}

/// A track record with its tier attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatedTrack {
    #[serde(flatten)]
    pub record: TrackRecord,
    pub tier: String,
    pub below_threshold: bool,
}

/// Everything a renderer needs for one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: AnalysisKind,
    pub name: String,
    pub image_url: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub average_score: i32,
    pub average_verdict: Verdict,
    pub track_count: usize,
    pub duplicate_count: usize,
    pub low_score_threshold: i32,
    pub tracks: Vec<RatedTrack>,
}

impl Report {
    /// Tracks under the low-score threshold, in batch order.
    pub fn below_threshold(&self) -> impl Iterator<Item = &RatedTrack> {
        self.tracks.iter().filter(|t| t.below_threshold)
    }
}

/// Resolves the request against the catalog and builds its report.
///
/// Catalog failures are returned as-is; nothing partial is produced.
#[tracing::instrument(skip_all, fields(kind = %request.kind, identifier = %request.identifier))]
pub async fn analyze_request<A: CatalogApi + ?Sized>(
    catalog: &A,
    request: &AnalysisRequest,
    options: &RatingOptions,
) -> Result<Report> {
    let identifier = request.identifier.trim();
    if identifier.is_empty() {
        return Err(AnalyzerError::EmptyIdentifier(request.kind));
    }

    let collection = match request.kind {
        AnalysisKind::Playlist => catalog.playlist(identifier).await?,
        AnalysisKind::Artist => catalog.artist_top_tracks(identifier).await?,
    };

    Ok(report_from_collection(collection, options))
}

/// Aggregates an already materialised collection and rates every track.
pub fn report_from_collection(collection: Collection, options: &RatingOptions) -> Report {
    let AnalysisResult {
        average_score,
        track_count,
        duplicate_count,
        records,
    } = analyze(&collection.entries);

    let tracks: Vec<RatedTrack> = records
        .into_iter()
        .map(|record| RatedTrack {
            tier: options.scheme.classify(record.score).name.clone(),
            below_threshold: record.score < options.low_score_threshold,
            record,
        })
        .collect();

    let average_verdict = if average_score >= options.good_average_threshold {
        Verdict::Good
    } else {
        Verdict::Poor
    };

    let report = Report {
        kind: collection.kind,
        name: collection.name,
        image_url: collection.image_url,
        generated_at: Utc::now(),
        average_score,
        average_verdict,
        track_count,
        duplicate_count,
        low_score_threshold: options.low_score_threshold,
        tracks,
    };

    info!(
        name = %report.name,
        tracks = report.track_count,
        average = report.average_score,
        duplicates = report.duplicate_count,
        below_threshold = report.below_threshold().count(),
        "Analysis complete"
    );

    report
}
