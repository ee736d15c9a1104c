//! Track popularity aggregation and tier classification.
//!
//! [`aggregate::analyze`] turns a batch of raw catalog entries into ranked
//! records with duplicate flags and a truncated average score.
//! [`grade::TierScheme`] maps scores onto a configurable tier table, and
//! [`analyzer`] combines both into the [`analyzer::Report`] handed to the
//! renderers.

pub mod aggregate;
pub mod analyzer;
pub mod grade;
pub mod types;
pub mod utility;
