//! Runs emitted bundles through `node`. Every test returns early when no
//! `node` binary is on PATH.

use kumi::core::interfaces::BuildService;
use kumi::core::models::{BuildConfig, ModuleIdentity, OutputConfig};
use kumi::core::services::KumiBuildService;
use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn node_available() -> bool {
    let available = Command::new("node")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("node not found on PATH, skipping bundle execution");
    }
    available
}

/// Builds `entry` inside the fixture and returns what the bundle prints.
async fn run(name: &str, entry: &str, identity: ModuleIdentity) -> String {
    let outdir = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        root: fixture(name),
        entry: Some(entry.to_string()),
        output: OutputConfig {
            path: outdir.path().to_path_buf(),
            filename: "bundle.js".to_string(),
        },
        module_identity: identity,
        ..BuildConfig::default()
    };

    let result = KumiBuildService::with_defaults().build(&config).await.unwrap();
    let output = Command::new("node").arg(&result.output_file.path).output().unwrap();

    assert!(
        output.status.success(),
        "bundle for {} failed:\n{}",
        name,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[tokio::test]
async fn test_linear_chain_runs() {
    if !node_available() {
        return;
    }
    assert_eq!(run("linear-chain", "a.js", ModuleIdentity::PerPath).await, "chain (linked)\n");
}

#[tokio::test]
async fn test_cycle_resolves_through_cached_exports() {
    if !node_available() {
        return;
    }
    assert_eq!(run("cyclic", "main.js", ModuleIdentity::PerPath).await, "true\n");
}

#[tokio::test]
async fn test_repeated_import_runs_once_per_module() {
    if !node_available() {
        return;
    }

    let shared = run("repeated-import", "a.js", ModuleIdentity::PerPath).await;
    assert_eq!(shared, "b runs\n");

    // two assets exist, but a.js maps './b.js' to one id, so one of them runs
    let separate = run("repeated-import", "a.js", ModuleIdentity::PerImport).await;
    assert_eq!(separate, "b runs\n");
}

#[tokio::test]
async fn test_require_uses_the_callers_mapping() {
    if !node_available() {
        return;
    }

    // './util.js' names a different file in main.js and lib/entry.js, and
    // state.js is evaluated once and shared by both importers
    let output = run("scoped-require", "main.js", ModuleIdentity::PerPath).await;
    assert_eq!(output, "state runs\nlib\nlib>main\nroot util,lib util\n");
}

#[tokio::test]
async fn test_unmapped_specifier_throws() {
    if !node_available() {
        return;
    }

    let output = run("unmapped-require", "a.js", ModuleIdentity::PerPath).await;
    assert_eq!(output, "Cannot find module './ghost.js' from module 0\n");
}

#[tokio::test]
async fn test_import_below_first_use() {
    if !node_available() {
        return;
    }
    assert_eq!(run("hoisted-import", "a.js", ModuleIdentity::PerPath).await, "hoisted\n");
}

#[tokio::test]
async fn test_imported_bindings_are_live() {
    if !node_available() {
        return;
    }
    assert_eq!(run("live-binding", "a.js", ModuleIdentity::PerPath).await, "2\n");
}

#[tokio::test]
async fn test_nested_project_runs() {
    if !node_available() {
        return;
    }

    let output = run("nested-project", "src/main.js", ModuleIdentity::PerPath).await;
    assert_eq!(output, "<button>[[save]]</button>\n");
}
