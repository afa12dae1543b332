use kumi::core::interfaces::BuildService;
use kumi::core::models::{BuildConfig, ModuleIdentity, OutputConfig};
use kumi::core::services::KumiBuildService;
use kumi::utils::{CliOverrides, ConfigLoader, KumiError};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn config(root: &Path, entry: &str, outdir: &Path) -> BuildConfig {
    BuildConfig {
        root: root.to_path_buf(),
        entry: Some(entry.to_string()),
        output: OutputConfig {
            path: outdir.to_path_buf(),
            filename: "bundle.js".to_string(),
        },
        ..BuildConfig::default()
    }
}

#[tokio::test]
async fn test_linear_chain_build() {
    let outdir = tempfile::tempdir().unwrap();
    let config = config(&fixture("linear-chain"), "a.js", outdir.path());

    let result = KumiBuildService::with_defaults().build(&config).await;
    assert!(result.is_ok(), "Build should succeed");

    let build_result = result.unwrap();
    assert_eq!(build_result.graph.len(), 3);

    let bundle_path = outdir.path().join("bundle.js");
    assert!(bundle_path.exists(), "bundle.js should exist");

    let bundle = std::fs::read_to_string(&bundle_path).unwrap();
    assert!(bundle.contains("  0: [\n"));
    assert!(bundle.contains("  2: [\n"));
    assert!(bundle.contains(r#"{"./b.js":1}"#));
    assert!(bundle.contains(r#"{"./c.js":2}"#));
    assert!(bundle.contains("function describe(name)"));
    assert!(!bundle.contains("import {"));
}

#[tokio::test]
async fn test_builds_are_deterministic() {
    let first_out = tempfile::tempdir().unwrap();
    let second_out = tempfile::tempdir().unwrap();
    let service = KumiBuildService::with_defaults();

    let first = service
        .build(&config(&fixture("nested-project"), "src/main.js", first_out.path()))
        .await
        .unwrap();
    let second = service
        .build(&config(&fixture("nested-project"), "src/main.js", second_out.path()))
        .await
        .unwrap();

    assert_eq!(first.output_file.content, second.output_file.content);
}

#[tokio::test]
async fn test_cyclic_imports_bundle_each_file_once() {
    let outdir = tempfile::tempdir().unwrap();
    let result = KumiBuildService::with_defaults()
        .build(&config(&fixture("cyclic"), "main.js", outdir.path()))
        .await
        .unwrap();

    assert_eq!(result.graph.len(), 3);
    let bundle = result.output_file.content;
    assert_eq!(bundle.matches("function isOdd(n)").count(), 1);
    assert!(bundle.contains(r#"{"./even.js":1}"#));
}

#[tokio::test]
async fn test_missing_dependency_writes_nothing() {
    let outdir = tempfile::tempdir().unwrap();
    let target = outdir.path().join("out");

    let err = KumiBuildService::with_defaults()
        .build(&config(&fixture("missing-dependency"), "a.js", &target))
        .await
        .unwrap_err();

    match err {
        KumiError::Read { path, .. } => assert!(path.ends_with("missing.js")),
        other => panic!("expected read error, got {:?}", other),
    }
    assert!(!target.exists(), "no output should be written on failure");
}

#[tokio::test]
async fn test_missing_entry_fails_before_io() {
    let outdir = tempfile::tempdir().unwrap();
    let mut config = config(&fixture("linear-chain"), "a.js", outdir.path());
    config.entry = None;

    let err = KumiBuildService::with_defaults().build(&config).await.unwrap_err();
    assert!(matches!(err, KumiError::Config(_)));
    assert!(!outdir.path().join("bundle.js").exists());
}

#[tokio::test]
async fn test_repeated_import_per_import_identity() {
    let outdir = tempfile::tempdir().unwrap();
    let mut config = config(&fixture("repeated-import"), "a.js", outdir.path());
    config.module_identity = ModuleIdentity::PerImport;

    let result = KumiBuildService::with_defaults().build(&config).await.unwrap();

    assert_eq!(result.graph.len(), 3);
    assert_eq!(result.output_file.content.matches("console.log('b runs');").count(), 2);
}

#[tokio::test]
async fn test_build_from_config_file() {
    let root = fixture("nested-project");
    let file_config = ConfigLoader::load_from_file(&root).unwrap();
    assert!(file_config.is_some(), "fixture ships a kumi.config.json");

    let outdir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::merge_with_cli(
        file_config,
        root,
        CliOverrides {
            outdir: Some(outdir.path().to_string_lossy().to_string()),
            ..Default::default()
        },
    );

    let result = KumiBuildService::with_defaults().build(&config).await.unwrap();

    assert_eq!(result.graph.len(), 4);
    assert!(outdir.path().join("app.js").exists(), "filename comes from the config file");
}
