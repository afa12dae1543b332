use crate::core::extractor::AssetExtractor;
use crate::core::models::*;
use crate::core::resolver::PathResolver;
use crate::utils::{KumiError, Logger, Result, Timer};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Traversal settings taken from [`BuildConfig`].
#[derive(Debug, Clone)]
pub struct GraphOptions {
    pub resolve_strategy: ResolveStrategy,
    pub module_identity: ModuleIdentity,
    pub resolve_extensions: Vec<String>,
    pub max_modules: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            resolve_strategy: ResolveStrategy::default(),
            module_identity: ModuleIdentity::default(),
            resolve_extensions: default_resolve_extensions(),
            max_modules: default_max_modules(),
        }
    }
}

impl From<&BuildConfig> for GraphOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            resolve_strategy: config.resolve_strategy,
            module_identity: config.module_identity,
            resolve_extensions: config.resolve_extensions.clone(),
            max_modules: config.max_modules,
        }
    }
}

/// Breadth-first walk from the entry module that assigns ids and fills in
/// every asset's specifier mapping.
pub struct GraphBuilder {
    extractor: AssetExtractor,
    options: GraphOptions,
}

impl GraphBuilder {
    pub fn new(extractor: AssetExtractor, options: GraphOptions) -> Self {
        Self { extractor, options }
    }

    pub async fn build_graph(&mut self, entry: &str, base_dir: &Path) -> Result<ModuleGraph> {
        if entry.trim().is_empty() {
            return Err(KumiError::config("entry must be a non-empty path"));
        }

        let _timer = Timer::start("Module graph construction");
        self.extractor.reset_ids();

        let resolver = PathResolver::new(
            self.options.resolve_strategy,
            base_dir,
            &self.options.resolve_extensions,
        )?;
        let entry_path = resolver.resolve_entry(entry, self.extractor.file_system());

        let mut graph = ModuleGraph::new();
        let mut by_path: HashMap<PathBuf, ModuleId> = HashMap::new();
        let mut queue = VecDeque::new();

        let root = self.extractor.extract(&entry_path).await?;
        by_path.insert(root.file_path.clone(), root.id);
        queue.push_back(root.id);
        graph.push(root);

        while let Some(parent_id) = queue.pop_front() {
            let Some(parent) = graph.get(parent_id) else {
                continue;
            };
            let deps = parent.deps.clone();
            let importer = parent.file_path.clone();

            for specifier in deps {
                if specifier.is_empty() {
                    Logger::debug(&format!("Skipping empty import in module {}", parent_id));
                    continue;
                }

                let resolved = resolver.resolve(&specifier, &importer, self.extractor.file_system());

                let reuse = match self.options.module_identity {
                    ModuleIdentity::PerPath => by_path.get(&resolved).copied(),
                    ModuleIdentity::PerImport => None,
                };

                let child_id = match reuse {
                    Some(id) => id,
                    None => {
                        if graph.len() >= self.options.max_modules {
                            return Err(KumiError::graph(format!(
                                "more than {} modules reached from {} (last import '{}' in {}); \
                                 cyclic imports never terminate with per-import module identity",
                                self.options.max_modules,
                                entry,
                                specifier,
                                importer.display()
                            )));
                        }

                        let child = self.extractor.extract(&resolved).await?;
                        let child_id = child.id;
                        by_path.entry(child.file_path.clone()).or_insert(child_id);
                        queue.push_back(child_id);
                        graph.push(child);
                        child_id
                    }
                };

                Logger::dependency_resolved(&specifier, parent_id, child_id);
                if let Some(parent) = graph.get_mut(parent_id) {
                    parent.mapping.insert(specifier, child_id);
                }
            }
        }

        Ok(graph)
    }
}
