//! Error types surfaced to the user.
//!
//! The aggregator itself never fails. Everything here comes from the
//! collaborators around it: identifier resolution, the catalog API,
//! credentials and tier-table configuration.

use crate::services::catalog_api::AnalysisKind;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The identifier could not be resolved to a catalog entity.
    #[error("could not resolve {kind} '{identifier}'")]
    Resolution {
        kind: AnalysisKind,
        identifier: String,
    },

    /// The catalog API failed or timed out.
    #[error("music catalog unavailable: {0}")]
    SourceUnavailable(String),

    /// The catalog rejected the supplied client credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("missing Spotify credentials: {0}")]
    MissingCredentials(String),

    #[error("please enter a valid {0} ID or URL")]
    EmptyIdentifier(AnalysisKind),

    #[error("invalid tier scheme: {0}")]
    InvalidTierScheme(String),
}

impl AnalyzerError {
    pub fn resolution(kind: AnalysisKind, identifier: &str) -> Self {
        AnalyzerError::Resolution {
            kind,
            identifier: identifier.to_string(),
        }
    }
}
