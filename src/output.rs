//! Report rendering and persistence.
//!
//! Supports a plain-text summary, pretty JSON, a standalone HTML page, and
//! CSV append of one row per track.

use crate::analyzers::analyzer::{RatedTrack, Report, Verdict};
use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Html => Ok(render_html(report)),
    }
}

/// Serializes the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Good => "good",
        Verdict::Poor => "poor",
    }
}

fn text_line(out: &mut String, track: &RatedTrack) {
    let record = &track.record;
    let _ = writeln!(
        out,
        "  #{:<4} {} - {}  [{} {}]{}",
        record.position,
        record.name,
        record.artist,
        record.score,
        track.tier,
        if record.is_duplicate { " (duplicate)" } else { "" }
    );
}

/// Human-readable summary for the terminal.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Popularity report: {} ({} tracks)", report.name, report.track_count);
    let _ = writeln!(
        out,
        "Average popularity: {}/100 ({})",
        report.average_score,
        verdict_label(report.average_verdict)
    );
    let _ = writeln!(out, "Duplicates: {}", report.duplicate_count);
    out.push('\n');

    let low: Vec<&RatedTrack> = report.below_threshold().collect();
    if low.is_empty() {
        let _ = writeln!(
            out,
            "No high-risk tracks (score < {}).",
            report.low_score_threshold
        );
    } else {
        let _ = writeln!(
            out,
            "High-risk tracks (score < {}): {} found, consider removing them",
            report.low_score_threshold,
            low.len()
        );
        for track in low {
            text_line(&mut out, track);
        }
    }
    out.push('\n');

    let _ = writeln!(out, "All tracks");
    for track in &report.tracks {
        text_line(&mut out, track);
    }
    out
}

const STYLESHEET: &str = r#"
body { background-color: #0b0c15; color: #ffffff; font-family: sans-serif; max-width: 760px; margin: 0 auto; padding: 20px; }
h1 { background: linear-gradient(90deg, #7b2cbf 0%, #00bfff 100%); -webkit-background-clip: text; -webkit-text-fill-color: transparent; text-align: center; font-weight: 800; }
.card { background-color: #161823; border: 1px solid #2a2d3e; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
.card.scroll { max-height: 450px; overflow-y: auto; }
.artwork { text-align: center; }
.score-badge-good { color: #00bfff; font-size: 3.5rem; font-weight: bold; text-align: center; }
.score-badge-bad { color: #ff4d4d; font-size: 3.5rem; font-weight: bold; text-align: center; }
.track-item { display: flex; align-items: center; justify-content: space-between; padding: 5px 0; margin-bottom: 10px; border-bottom: 1px solid #2a2d3e; }
.track-index { color: #00bfff; font-weight: bold; min-width: 35px; text-align: right; }
.track-name-artist { flex-grow: 1; margin-left: 10px; }
.track-artist { color: #a0a0b0; font-style: italic; }
.track-duplicate { color: #9d4edd; font-size: 0.8rem; margin-left: 6px; }
.low-track-name { color: #ff4d4d; font-weight: bold; }
.track-score { font-weight: bold; min-width: 50px; text-align: right; padding: 5px 10px; border-radius: 6px; background-color: #2a2d3e; }
.tier-excellent, .tier-high, .tier-superb, .tier-great { background-color: #00bfff; }
.tier-good, .tier-fair { background-color: #3a86ff; }
.tier-average, .tier-medium, .tier-modest { background-color: #9d4edd; }
.tier-low, .tier-weak, .tier-poor { background-color: #e56b6f; }
.tier-critical, .tier-dead { background-color: #ff4d4d; }
"#;

/// Escapes text for use inside HTML element content and quoted attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// CSS class fragment for a tier name: lowercase, non-alphanumerics to `-`.
fn tier_class(tier: &str) -> String {
    tier.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

/// One track as an HTML fragment.
pub fn render_track_html(track: &RatedTrack) -> String {
    let record = &track.record;
    let name_class = if track.below_threshold { "low-track-name" } else { "" };
    let duplicate = if record.is_duplicate {
        r#" <span class="track-duplicate">duplicate</span>"#
    } else {
        ""
    };

    format!(
        r#"<div class="track-item">
  <span class="track-index">#{position}</span>
  <div class="track-name-artist">
    <span class="{name_class}">{name}</span> <span class="track-artist">by {artist}</span>{duplicate}
  </div>
  <span class="track-score tier-{tier}" title="{tier_title}">{score}</span>
</div>
"#,
        position = record.position,
        name = escape_html(&record.name),
        artist = escape_html(&record.artist),
        tier = tier_class(&track.tier),
        tier_title = escape_html(&track.tier),
        score = record.score,
    )
}

/// Standalone HTML page with embedded styles.
pub fn render_html(report: &Report) -> String {
    let mut out = String::new();
    let name = escape_html(&report.name);
    let badge = match report.average_verdict {
        Verdict::Good => "score-badge-good",
        Verdict::Poor => "score-badge-bad",
    };

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Popularity report: {name}</title>\n<style>{STYLESHEET}</style>\n</head>\n<body>\n<h1>Popularity report</h1>\n"
    );
    let _ = writeln!(out, "<h3>Results for: {name} ({} tracks)</h3>", report.track_count);

    out.push_str("<div class=\"card artwork\">\n");
    match &report.image_url {
        Some(url) => {
            let _ = writeln!(out, "<img src=\"{}\" width=\"180\" alt=\"{name}\">", escape_html(url));
        }
        None => out.push_str("<p>Artwork not found</p>\n"),
    }
    out.push_str("</div>\n");

    let _ = writeln!(
        out,
        "<div class=\"card\">\n<h4>Average popularity</h4>\n<p class=\"{badge}\">{}/100</p>\n<p>Duplicates: {}</p>\n</div>",
        report.average_score, report.duplicate_count
    );

    let low: Vec<&RatedTrack> = report.below_threshold().collect();
    let _ = writeln!(out, "<h3>High-risk tracks (score &lt; {})</h3>", report.low_score_threshold);
    if low.is_empty() {
        out.push_str("<p>No high-risk tracks found.</p>\n");
    } else {
        let _ = writeln!(
            out,
            "<p>{} tracks with very low engagement, consider removing them.</p>",
            low.len()
        );
        out.push_str("<div class=\"card scroll\">\n");
        for track in low {
            out.push_str(&render_track_html(track));
        }
        out.push_str("</div>\n");
    }

    out.push_str("<h3>All tracks</h3>\n<div class=\"card scroll\">\n");
    for track in &report.tracks {
        out.push_str(&render_track_html(track));
    }
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

/// One CSV row per track.
#[derive(Serialize)]
struct TrackRow<'a> {
    generated_at: DateTime<Utc>,
    collection: &'a str,
    position: usize,
    name: &'a str,
    artist: &'a str,
    score: i32,
    tier: &'a str,
    is_duplicate: bool,
    below_threshold: bool,
}

/// Appends every track of `report` as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, report: &Report) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = report.tracks.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for track in &report.tracks {
        writer.serialize(TrackRow {
            generated_at: report.generated_at,
            collection: &report.name,
            position: track.record.position,
            name: &track.record.name,
            artist: &track.record.artist,
            score: track.record.score,
            tier: &track.tier,
            is_duplicate: track.record.is_duplicate,
            below_threshold: track.below_threshold,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::report_from_collection;
    use crate::analyzers::types::RawTrackEntry;
    use crate::config::RatingOptions;
    use crate::services::catalog_api::{AnalysisKind, Collection};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_report() -> Report {
        let collection = Collection {
            kind: AnalysisKind::Playlist,
            name: "Rock & <Roll>".into(),
            image_url: Some("https://img.test/c.jpg?a=1&b=2".into()),
            entries: vec![
                RawTrackEntry::new(Some("t1"), "Loud", "Band", 92),
                RawTrackEntry::new(Some("t2"), "Quiet", "Solo", 5),
                RawTrackEntry::new(Some("t1"), "Loud", "Band", 92),
            ],
        };
        report_from_collection(collection, &RatingOptions::default())
    }

    fn empty_report() -> Report {
        let collection = Collection {
            kind: AnalysisKind::Artist,
            name: "Nobody".into(),
            image_url: None,
            entries: vec![],
        };
        report_from_collection(collection, &RatingOptions::default())
    }

    #[test]
    fn test_render_text_summary() {
        let text = render_text(&sample_report());

        assert!(text.starts_with("Popularity report: Rock & <Roll> (3 tracks)"));
        assert!(text.contains("Average popularity: 63/100 (good)"));
        assert!(text.contains("Duplicates: 1"));
        assert!(text.contains("High-risk tracks (score < 20): 1 found"));
        assert!(text.contains("Quiet - Solo  [5 critical]"));
        assert_eq!(text.matches("(duplicate)").count(), 1);
    }

    #[test]
    fn test_render_text_without_low_tracks() {
        let text = render_text(&empty_report());
        assert!(text.contains("No high-risk tracks (score < 20)."));
        assert!(text.contains("Average popularity: 0/100 (poor)"));
    }

    #[test]
    fn test_render_json_is_valid() {
        let json = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["track_count"], 3);
        assert_eq!(value["tracks"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_render_html_escapes_and_classifies() {
        let html = render_html(&sample_report());

        assert!(html.contains("Rock &amp; &lt;Roll&gt;"));
        assert!(!html.contains("<Roll>"));
        assert!(html.contains("https://img.test/c.jpg?a=1&amp;b=2"));
        assert!(html.contains("score-badge-good"));
        assert!(html.contains("track-score tier-excellent"));
        assert!(html.contains("track-score tier-critical"));
        // the low track appears in both the high-risk list and the full list
        assert_eq!(html.matches(r#"<span class="low-track-name">Quiet</span>"#).count(), 2);
    }

    #[test]
    fn test_render_html_empty_report() {
        let html = render_html(&empty_report());
        assert!(html.contains("Artwork not found"));
        assert!(html.contains("No high-risk tracks found."));
        assert!(html.contains("score-badge-bad"));
    }

    #[test]
    fn test_tier_class_sanitizes() {
        assert_eq!(tier_class("Very Good!"), "very-good-");
        assert_eq!(tier_class("excellent"), "excellent");
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("popularity_rater_test_header.csv");
        let _ = fs::remove_file(&path);

        let report = sample_report();
        append_records(&path, &report).unwrap();
        append_records(&path, &report).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 x 3 rows
        assert_eq!(content.lines().count(), 7);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_empty_report_creates_file() {
        let path = temp_path("popularity_rater_test_empty.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &empty_report()).unwrap();
        assert!(Path::new(&path).exists());

        fs::remove_file(&path).unwrap();
    }
}
