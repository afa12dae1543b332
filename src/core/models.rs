use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Position of a module in the graph; also the key the bundle runtime uses.
pub type ModuleId = usize;

/// One discovered module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: ModuleId,
    pub file_path: PathBuf,
    #[serde(skip)]
    pub code: String,
    /// Import specifiers exactly as written, in source order.
    pub deps: Vec<String>,
    /// Specifier to module id, filled in by the graph builder.
    pub mapping: IndexMap<String, ModuleId>,
}

impl Asset {
    pub fn new(id: ModuleId, file_path: PathBuf, code: String, deps: Vec<String>) -> Self {
        Self {
            id,
            file_path,
            code,
            deps,
            mapping: IndexMap::new(),
        }
    }
}

/// All assets reachable from the entry in breadth-first discovery order.
/// `assets()[i].id == i` for every asset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleGraph {
    assets: Vec<Asset>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, asset: Asset) {
        debug_assert_eq!(asset.id, self.assets.len());
        self.assets.push(asset);
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn get(&self, id: ModuleId) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut Asset> {
        self.assets.get_mut(id)
    }

    pub fn root(&self) -> Option<&Asset> {
        self.assets.first()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Result of normalizing one module's source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    pub code: String,
    pub imports: Vec<String>,
}

/// How an import specifier is turned into a file path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolveStrategy {
    /// Relative to the directory of the importing file.
    #[default]
    Importer,
    /// Relative to the project root, whatever file imports it.
    BaseDir,
}

/// Whether repeated imports of one file share a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleIdentity {
    /// One module per resolved path; repeated and cyclic imports reuse it.
    #[default]
    PerPath,
    /// A fresh module for every import occurrence. Cycles are cut off by `max_modules`.
    PerImport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

impl OutputConfig {
    pub fn file(&self) -> PathBuf {
        self.path.join(&self.filename)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_output_filename(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub resolve_strategy: ResolveStrategy,
    #[serde(default)]
    pub module_identity: ModuleIdentity,
    #[serde(default = "default_resolve_extensions")]
    pub resolve_extensions: Vec<String>,
    #[serde(default = "default_max_modules")]
    pub max_modules: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dist")
}

fn default_output_filename() -> String {
    "bundle.js".to_string()
}

pub(crate) fn default_resolve_extensions() -> Vec<String> {
    vec![".js".to_string(), ".mjs".to_string()]
}

pub(crate) fn default_max_modules() -> usize {
    10_000
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            entry: None,
            output: OutputConfig::default(),
            resolve_strategy: ResolveStrategy::default(),
            module_identity: ModuleIdentity::default(),
            resolve_extensions: default_resolve_extensions(),
            max_modules: default_max_modules(),
        }
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub graph: ModuleGraph,
    pub output_file: OutputFile,
    pub build_time: std::time::Duration,
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
    pub size: usize,
}
