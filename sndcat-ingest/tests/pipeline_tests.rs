//! End-to-end ingest runs against temp files and a fake asset API

mod helpers;

use helpers::fake_assets::ok_body;
use helpers::{FakeAssets, LogCapture, TestCatalog};
use serde_json::{json, Value};
use async_trait::async_trait;
use sndcat_ingest::services::{
    load_candidates, AssetClient, AssetResponse, AssetTransport, CatalogStore, CommitOutcome,
    LookupError, TagClassifier,
};
use sndcat_ingest::{
    run_ingest, CliOverrides, IngestError, IngestPipeline, IngestSettings, InputKind,
};
use sndcat_common::config::{LookupConfig, TomlConfig};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::Level;

fn boat_horn_catalog() -> Value {
    json!({"sounds": [{"id": "1", "name": "Boat Horn", "tags": ["ui"]}]})
}

fn names(catalog: &Value) -> Vec<String> {
    catalog["sounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_known_id_is_never_looked_up() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(boat_horn_catalog());
    fixture.write_candidates(json!({"ids": ["1", "2"]}));

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("2", "Kill Sound"));
    let candidates = load_candidates(&fixture.candidates_path).unwrap();
    let outcome = pipeline.run(candidates, false).await.unwrap();

    assert_eq!(pipeline.client().transport().calls(), vec!["2"]);
    assert_eq!(
        fixture.read_catalog(),
        json!({"sounds": [
            {"id": "1", "name": "Boat Horn", "tags": ["ui"]},
            {"id": "2", "name": "Kill Sound", "tags": ["kill"]}
        ]})
    );
    assert_eq!(outcome.report.added, 1);
    assert_eq!(outcome.report.already_present, 1);
    assert_eq!(outcome.report.catalog_size, 2);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(boat_horn_catalog());
    fixture.write_candidates(json!({"ids": ["1", "2", "3"]}));

    let first = fixture.pipeline(
        FakeAssets::new()
            .with_name("2", "Kill Sound")
            .with_name("3", "Menu Click"),
    );
    first
        .run(load_candidates(&fixture.candidates_path).unwrap(), false)
        .await
        .unwrap();
    let after_first = fixture.catalog_bytes();

    let second = fixture.pipeline(
        FakeAssets::new()
            .with_name("2", "Kill Sound")
            .with_name("3", "Menu Click"),
    );
    let outcome = second
        .run(load_candidates(&fixture.candidates_path).unwrap(), false)
        .await
        .unwrap();

    assert!(second.client().transport().calls().is_empty());
    assert_eq!(outcome.report.added, 0);
    assert_eq!(outcome.report.already_present, 3);
    assert_eq!(fixture.catalog_bytes(), after_first);
}

#[tokio::test]
async fn test_output_invariants_hold() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!({"sounds": [
        {"id": "30", "name": "zap", "tags": []},
        {"id": "31", "name": "Zap", "tags": ["ui"]},
        {"id": "32", "name": "Applause", "tags": ["meme", "meme"]}
    ]}));

    let assets = FakeAssets::new()
        .with_name("40", "Headshot Ding")
        .with_name("41", "APPLAUSE")
        .with_name("42", "Button Hover")
        .with_name("43", "phonk beat");
    let candidates = sndcat_ingest::services::parse_candidates(json!({
        "ids": [40, "41", " 42 ", "43", -5, "4.5", null]
    }));

    let outcome = fixture.pipeline(assets).run(candidates, false).await.unwrap();
    let catalog = fixture.read_catalog();
    let records = catalog["sounds"].as_array().unwrap();

    let ids: HashSet<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    let lower: HashSet<String> = names(&catalog).iter().map(|n| n.to_lowercase()).collect();
    assert_eq!(ids.len(), records.len());
    assert_eq!(lower.len(), records.len());
    assert!(records
        .iter()
        .all(|r| !r["tags"].as_array().unwrap().is_empty()));

    let sorted = names(&catalog);
    let mut expected = sorted.clone();
    expected.sort_by_key(|n| n.to_lowercase());
    assert_eq!(sorted, expected);

    assert_eq!(
        sorted,
        vec!["Applause", "Button Hover", "Headshot Ding", "phonk beat", "zap"]
    );
    assert_eq!(outcome.report.rejected, 3);
    assert_eq!(outcome.report.duplicate_names, 1);
}

#[tokio::test]
async fn test_dry_run_leaves_directory_untouched() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(boat_horn_catalog());
    fixture.write_candidates(json!({"ids": ["2"]}));
    let before = fixture.catalog_bytes();

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("2", "Kill Sound"));
    let outcome = pipeline
        .run(load_candidates(&fixture.candidates_path).unwrap(), true)
        .await
        .unwrap();

    assert_eq!(fixture.catalog_bytes(), before);
    assert_eq!(fixture.file_count(), 2);
    assert!(outcome.report.dry_run);
    let CommitOutcome::Previewed { rendered } = outcome.commit else {
        panic!("dry run must not write");
    };
    let preview: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(names(&preview), vec!["Boat Horn", "Kill Sound"]);
}

#[tokio::test]
async fn test_missing_catalog_fails_before_any_request() {
    let fixture = TestCatalog::new();
    fixture.write_candidates(json!({"ids": ["2"]}));

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("2", "Kill Sound"));
    let err = pipeline
        .run(load_candidates(&fixture.candidates_path).unwrap(), false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::MissingInput {
            kind: InputKind::Catalog,
            ..
        }
    ));
    assert_eq!(err.exit_code(), 2);
    assert!(pipeline.client().transport().calls().is_empty());
}

#[tokio::test]
async fn test_run_ingest_reports_missing_inputs() {
    let fixture = TestCatalog::new();
    let toml = TomlConfig {
        catalog_path: Some(fixture.catalog_path.clone()),
        candidates_path: Some(fixture.candidates_path.clone()),
        lookup: LookupConfig {
            // Unroutable; nothing may be requested before inputs are checked
            endpoint: Some("http://127.0.0.1:9/assets/{id}".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let settings = IngestSettings::resolve(&CliOverrides::default(), &toml).unwrap();

    let err = run_ingest(&settings, false).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::MissingInput {
            kind: InputKind::Candidates,
            ..
        }
    ));

    fixture.write_candidates(json!({"ids": ["2"]}));
    let err = run_ingest(&settings, false).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::MissingInput {
            kind: InputKind::Catalog,
            ..
        }
    ));
}

#[tokio::test]
async fn test_pre_resolved_candidates_skip_lookup() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!({"sounds": []}));
    fixture.write_candidates(json!([
        {"id": 7, "name": "Death Bell"},
        {"id": "8", "name": "  "}
    ]));

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("8", "Song Intro"));
    let outcome = pipeline
        .run(load_candidates(&fixture.candidates_path).unwrap(), false)
        .await
        .unwrap();

    assert_eq!(pipeline.client().transport().calls(), vec!["8"]);
    assert_eq!(outcome.report.resolved, 2);
    assert_eq!(
        fixture.read_catalog(),
        json!({"sounds": [
            {"id": "7", "name": "Death Bell", "tags": ["kill"]},
            {"id": "8", "name": "Song Intro", "tags": ["music"]}
        ]})
    );
}

#[tokio::test]
async fn test_bare_array_shape_is_preserved() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!([{"id": "1", "name": "Boat Horn", "tags": ["ui"]}]));

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("2", "Kill Sound"));
    pipeline
        .run(sndcat_ingest::services::parse_candidates(json!({"ids": [2]})), false)
        .await
        .unwrap();

    let catalog = fixture.read_catalog();
    assert!(catalog.is_array());
    assert_eq!(catalog.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_extra_top_level_keys_survive() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!({
        "version": 3,
        "sounds": [{"id": "1", "name": "Boat Horn", "tags": ["ui"]}]
    }));

    let pipeline = fixture.pipeline(FakeAssets::new());
    pipeline.run(Vec::new(), false).await.unwrap();

    assert_eq!(fixture.read_catalog()["version"], json!(3));
}

#[tokio::test]
async fn test_backup_holds_previous_contents() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(boat_horn_catalog());
    let before = fixture.catalog_bytes();

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("2", "Kill Sound"));
    let outcome = pipeline
        .run(sndcat_ingest::services::parse_candidates(json!({"ids": ["2"]})), false)
        .await
        .unwrap();

    let backups = fixture.backups();
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read(&backups[0]).unwrap(), before);
    assert!(matches!(
        outcome.commit,
        CommitOutcome::Written { backup: Some(_), .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_lookup_failures_are_skipped_and_counted() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!({"sounds": []}));

    let assets = FakeAssets::new()
        .with_responses("4", vec![AssetResponse::new(500, "")])
        .with_responses(
            "5",
            vec![AssetResponse::new(503, ""), ok_body("Click Pop")],
        );
    let pipeline = fixture.pipeline(assets);
    let outcome = pipeline
        .run(
            sndcat_ingest::services::parse_candidates(json!({"ids": ["3", "4", "5"]})),
            false,
        )
        .await
        .unwrap();

    let transport = pipeline.client().transport();
    assert_eq!(transport.calls_for("3"), 1);
    assert_eq!(transport.calls_for("4"), 3);
    assert_eq!(transport.calls_for("5"), 2);
    assert_eq!(outcome.report.lookup_failures, 2);
    assert_eq!(outcome.report.added, 1);
    assert_eq!(names(&fixture.read_catalog()), vec!["Click Pop"]);
}

#[tokio::test]
async fn test_loaded_records_with_odd_shapes_survive_a_write() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!({"sounds": [
        {"id": "1", "name": "Boat Horn", "tags": null},
        {"id": "2", "name": "Kill Sound", "tags": "kill"},
        {"id": "3", "name": "Menu Click", "tags": ["ui"]},
        {"id": 1234.0, "name": "Bass Drop Remix", "tags": ["music", 5]},
        {"id": 77, "name": "Oof"}
    ]}));

    let outcome = fixture
        .pipeline(FakeAssets::new())
        .run(Vec::new(), false)
        .await
        .unwrap();

    assert_eq!(outcome.report.catalog_size, 5);
    assert_eq!(
        fixture.read_catalog(),
        json!({"sounds": [
            {"id": "1234", "name": "Bass Drop Remix", "tags": ["music"]},
            {"id": "1", "name": "Boat Horn", "tags": ["meme"]},
            {"id": "2", "name": "Kill Sound", "tags": ["kill"]},
            {"id": "3", "name": "Menu Click", "tags": ["ui"]},
            {"id": "77", "name": "Oof", "tags": ["meme"]}
        ]})
    );
}

#[tokio::test]
async fn test_loaded_float_id_still_blocks_its_candidate() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(json!([{"id": 1234.0, "name": "Boat Horn", "tags": ["ui"]}]));

    let pipeline = fixture.pipeline(FakeAssets::new().with_name("1234", "Other Name"));
    let outcome = pipeline
        .run(sndcat_ingest::services::parse_candidates(json!({"ids": [1234]})), false)
        .await
        .unwrap();

    assert!(pipeline.client().transport().calls().is_empty());
    assert_eq!(outcome.report.already_present, 1);
    assert_eq!(
        fixture.read_catalog(),
        json!([{"id": "1234", "name": "Boat Horn", "tags": ["ui"]}])
    );
}

/// Resolves every id, but first replaces the catalog file with a directory so
/// the final rename cannot succeed
struct CatalogClobberingAssets {
    catalog_path: PathBuf,
}

#[async_trait]
impl AssetTransport for CatalogClobberingAssets {
    async fn fetch(&self, id: &str) -> Result<AssetResponse, LookupError> {
        if self.catalog_path.is_file() {
            std::fs::remove_file(&self.catalog_path).unwrap();
            std::fs::create_dir(&self.catalog_path).unwrap();
            std::fs::write(self.catalog_path.join("keep"), "x").unwrap();
        }
        Ok(ok_body(&format!("Sound {}", id)))
    }
}

#[tokio::test]
async fn test_summary_is_logged_when_write_fails() {
    let fixture = TestCatalog::new();
    fixture.write_catalog(boat_horn_catalog());

    let pipeline = IngestPipeline::new(
        CatalogStore::new(&fixture.catalog_path),
        AssetClient::new(
            CatalogClobberingAssets {
                catalog_path: fixture.catalog_path.clone(),
            },
            helpers::fast_policy(),
        ),
        TagClassifier::default(),
    );

    let capture = LogCapture::new();
    let _guard = capture.install();
    let err = pipeline
        .run(
            sndcat_ingest::services::parse_candidates(json!({"ids": ["1", "2", "x"]})),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::CatalogWrite { .. }));
    assert_eq!(err.exit_code(), 3);
    let summaries = capture.matching(Level::ERROR, "candidates:");
    assert_eq!(summaries.len(), 1, "captured: {:?}", capture.records());
    assert!(summaries[0].contains("3 candidates: 2 validated, 1 resolved, 2 skipped, 1 added"));
}
