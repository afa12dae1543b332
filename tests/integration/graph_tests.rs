use kumi::core::models::{BuildConfig, ModuleGraph, ResolveStrategy};
use kumi::core::services::KumiBuildService;
use kumi::utils::KumiError;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

async fn graph_of(name: &str, entry: &str) -> ModuleGraph {
    let config = BuildConfig {
        root: fixture(name),
        entry: Some(entry.to_string()),
        ..BuildConfig::default()
    };
    KumiBuildService::with_defaults().build_graph(&config).await.unwrap()
}

fn file_names(graph: &ModuleGraph) -> Vec<String> {
    graph
        .assets()
        .iter()
        .map(|a| a.file_path.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[tokio::test]
async fn test_ids_are_contiguous_and_mappings_complete() {
    for (name, entry) in [
        ("linear-chain", "a.js"),
        ("cyclic", "main.js"),
        ("nested-project", "src/main.js"),
    ] {
        let graph = graph_of(name, entry).await;

        for (index, asset) in graph.assets().iter().enumerate() {
            assert_eq!(asset.id, index, "{}: ids follow discovery order", name);
            assert!(asset.file_path.is_absolute());
            for dep in &asset.deps {
                let target = asset.mapping[dep.as_str()];
                assert!(target < graph.len(), "{}: '{}' maps into the graph", name, dep);
            }
        }
    }
}

#[tokio::test]
async fn test_root_is_entry() {
    let graph = graph_of("nested-project", "src/main.js").await;

    let root = graph.root().unwrap();
    assert_eq!(root.id, 0);
    assert!(root.file_path.ends_with("src/main.js"));
}

#[tokio::test]
async fn test_nested_project_shares_modules_by_path() {
    let graph = graph_of("nested-project", "src/main.js").await;

    assert_eq!(file_names(&graph), vec!["main.js", "button.js", "format.js", "strings.js"]);

    let main = graph.get(0).unwrap();
    // extension-less import finds format.js
    assert_eq!(main.mapping["./utils/format"], 2);

    let button = graph.get(1).unwrap();
    assert_eq!(button.mapping["../utils/format.js"], 2);

    let format = graph.get(2).unwrap();
    assert_eq!(format.deps, vec!["./strings.js"]);
    assert_eq!(format.mapping["./strings.js"], 3);
}

#[tokio::test]
async fn test_base_dir_resolution_breaks_nested_imports() {
    let config = BuildConfig {
        root: fixture("nested-project"),
        entry: Some("src/main.js".to_string()),
        resolve_strategy: ResolveStrategy::BaseDir,
        ..BuildConfig::default()
    };

    // './components/button.js' is looked up at the project root, not in src/
    let err = KumiBuildService::with_defaults().build_graph(&config).await.unwrap_err();
    match err {
        KumiError::Read { path, .. } => {
            assert_eq!(path, fixture("nested-project").join("components/button.js"))
        }
        other => panic!("expected read error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_graph_serializes_without_code() {
    let graph = graph_of("linear-chain", "a.js").await;

    let json = serde_json::to_value(graph.assets()).unwrap();
    let first = &json[0];
    assert_eq!(first["id"], 0);
    assert_eq!(first["deps"][0], "./b.js");
    assert_eq!(first["mapping"]["./b.js"], 1);
    assert!(first.get("filePath").is_some());
    assert!(first.get("code").is_none());
}
