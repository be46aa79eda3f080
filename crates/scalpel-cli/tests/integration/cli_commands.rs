//! CLI commands over files on disk.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scalpel_cli::{cli, commands, run};
use scalpel_core::EditConfig;
use scalpel_intent::ResolutionSource;
use scalpel_model::EditType;
use scalpel_test_utils::{create_landing_page_manifest, file_block, split_at_offsets};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn manifest_file() -> NamedTempFile {
    write_temp(&serde_json::to_string(&create_landing_page_manifest()).unwrap())
}

async fn run_args(args: &[&str]) -> serde_json::Value {
    let matches = cli().try_get_matches_from(args).unwrap();
    serde_json::from_str(&run(&matches).await.unwrap()).unwrap()
}

#[tokio::test]
async fn classify_prints_intent() {
    let manifest = manifest_file();
    let path = manifest.path().to_str().unwrap();
    let report = run_args(&[
        "scalpel",
        "classify",
        "--manifest",
        path,
        "--prompt",
        "make the header background black",
    ])
    .await;

    assert_eq!(report["intent"]["editType"], "UPDATE_COMPONENT");
    assert_eq!(
        report["intent"]["targetFiles"],
        serde_json::json!(["src/components/Header.jsx"])
    );
    assert_eq!(report["source"], "name");
}

#[tokio::test]
async fn search_selects_target() {
    let manifest = manifest_file();
    let plan = write_temp(r#"{"editType":"UPDATE_STYLE","searchTerms":["bg-gray-900"]}"#);
    let report = run_args(&[
        "scalpel",
        "search",
        "--plan",
        plan.path().to_str().unwrap(),
        "-m",
        manifest.path().to_str().unwrap(),
    ])
    .await;

    assert_eq!(report["execution"]["success"], true);
    assert_eq!(report["target"]["filePath"], "src/components/Header.jsx");
    assert_eq!(report["target"]["lineNumber"], 3);
}

#[tokio::test]
async fn config_file_overrides_constants() {
    let manifest = manifest_file();
    let config = write_temp("[classifier]\ndefault_confidence = 0.25\n");
    let report = run_args(&[
        "scalpel",
        "classify",
        "-m",
        manifest.path().to_str().unwrap(),
        "-p",
        "zzz",
        "--config",
        config.path().to_str().unwrap(),
    ])
    .await;

    assert_eq!(report["intent"]["confidence"], 0.25);
    assert_eq!(report["rule"], serde_json::Value::Null);
}

#[tokio::test]
async fn extract_reads_response_file() {
    let response = write_temp(&format!(
        "{}\n<packages>\nlodash\naxios\n</packages>",
        file_block("src/A.jsx", "import x from '@heroicons/react/solid'\nexport const A = () => x")
    ));
    let report = run_args(&[
        "scalpel",
        "extract",
        "--input",
        response.path().to_str().unwrap(),
        "--chunk-size",
        "3",
    ])
    .await;

    assert_eq!(
        report["dependencies"],
        serde_json::json!(["lodash", "axios", "@heroicons/react"])
    );
    assert_eq!(report["files"][0]["complete"], true);
}

#[tokio::test]
async fn missing_manifest_is_reported() {
    let matches = cli()
        .try_get_matches_from(["scalpel", "deps", "-m", "/nonexistent/manifest.json"])
        .unwrap();
    let err = run(&matches).await.unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/manifest.json"));
}

#[test]
fn deps_skips_local_and_builtin_imports() {
    let report = commands::deps(&create_landing_page_manifest(), &EditConfig::default());
    assert_eq!(report.files_scanned, 6);
    assert!(report.packages.is_empty());
}

#[test]
fn classify_command_keeps_decision_trail() {
    let report = commands::classify(
        "add a pricing section",
        &create_landing_page_manifest(),
        &EditConfig::default(),
    )
    .unwrap();
    assert_eq!(report.classification.intent.edit_type, EditType::AddFeature);
    assert!(report
        .classification
        .intent
        .target_files
        .contains(&"src/components/Pricing.jsx".to_string()));
    assert_ne!(report.classification.source, ResolutionSource::None);
}

proptest! {
    #[test]
    fn split_offsets_reassemble(text in "[a-zé<>/ ]{0,80}", offsets in prop::collection::vec(0usize..100, 0..8)) {
        let chunks = split_at_offsets(&text, &offsets);
        prop_assert_eq!(chunks.concat(), text);
    }
}
