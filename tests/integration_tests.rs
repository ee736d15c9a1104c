use popularity_rater::analyzers::aggregate::analyze;
use popularity_rater::analyzers::analyzer::{Verdict, report_from_collection};
use popularity_rater::analyzers::grade::{TierPreset, TierScheme};
use popularity_rater::analyzers::types::RawTrackEntry;
use popularity_rater::config::{RatingOptions, Settings};
use popularity_rater::output::{OutputFormat, render};
use popularity_rater::services::catalog_api::{AnalysisKind, Collection};

fn fixture() -> Vec<RawTrackEntry> {
    let bytes = include_str!("fixtures/sample_playlist.json");
    serde_json::from_str(bytes).expect("Failed to parse fixture")
}

#[test]
fn test_full_pipeline() {
    let entries = fixture();
    let result = analyze(&entries);

    // the entry without a popularity score is skipped
    assert_eq!(result.track_count, 9);
    // 78 + 84 + 0 + 91 + 55 + 84 + 12 + 19 + 78 = 501
    assert_eq!(result.average_score, 55);
    // second "Take On Me" and second "Never Gonna Give You Up"
    assert_eq!(result.duplicate_count, 2);

    let duplicates: Vec<usize> = result
        .records
        .iter()
        .filter(|r| r.is_duplicate)
        .map(|r| r.position)
        .collect();
    assert_eq!(duplicates, vec![6, 9]);

    for (i, record) in result.records.iter().enumerate() {
        assert_eq!(record.position, i + 1);
    }

    let low: Vec<&str> = result
        .below_threshold(20)
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(low, vec!["Demo (local file)", "Obscure B-Side", "Another Local File"]);
}

#[test]
fn test_report_with_three_tier_preset() {
    let collection = Collection {
        kind: AnalysisKind::Playlist,
        name: "sample_playlist".into(),
        image_url: None,
        entries: fixture(),
    };
    let settings: Settings = serde_json::from_str(r#"{"preset": "three"}"#).unwrap();
    let report = report_from_collection(collection, &settings.rating_options().unwrap());

    assert_eq!(report.average_verdict, Verdict::Good);
    let highs = report.tracks.iter().filter(|t| t.tier == "high").count();
    let lows = report.tracks.iter().filter(|t| t.tier == "low").count();
    assert_eq!(highs, 5);
    assert_eq!(lows, 3);
    assert_eq!(report.below_threshold().count(), 3);
}

#[test]
fn test_rendered_formats() {
    let collection = Collection {
        kind: AnalysisKind::Playlist,
        name: "sample_playlist".into(),
        image_url: None,
        entries: fixture(),
    };
    let report = report_from_collection(collection, &RatingOptions::default());

    let text = render(&report, OutputFormat::Text).unwrap();
    assert!(text.contains("Average popularity: 55/100 (good)"));

    let json = render(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["duplicate_count"], 2);

    let html = render(&report, OutputFormat::Html).unwrap();
    assert_eq!(html.matches(r#"<div class="track-item">"#).count(), 9 + 3);
}

#[test]
fn test_every_score_classified_by_every_preset() {
    for preset in [TierPreset::Five, TierPreset::Three, TierPreset::Nine] {
        let scheme = TierScheme::preset(preset);
        let names: Vec<&str> = scheme.tiers().iter().map(|t| t.name.as_str()).collect();
        for score in 0..=100 {
            assert!(names.contains(&scheme.classify(score).name.as_str()));
        }
    }
}

#[test]
fn test_oversized_popularity_skips_only_that_entry() {
    let entries: Vec<RawTrackEntry> = serde_json::from_str(
        r#"[
            {"id": "a", "name": "Broken", "artist": "X", "popularity": 99999999999},
            {"id": "b", "name": "Kept", "artist": "X", "popularity": 30},
            {"id": "c", "name": "Also Kept", "artist": "Y", "popularity": 50}
        ]"#,
    )
    .expect("batch with an oversized score should still load");

    let result = analyze(&entries);
    assert_eq!(result.track_count, 2);
    assert_eq!(result.average_score, 40);
    assert_eq!(result.records[0].name, "Kept");
    assert_eq!(result.records[0].position, 1);
}
