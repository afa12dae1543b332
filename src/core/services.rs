use crate::core::extractor::AssetExtractor;
use crate::core::graph::{GraphBuilder, GraphOptions};
use crate::core::resolver::{absolute_path, normalize_path};
use crate::core::{interfaces::*, models::*};
use crate::infrastructure::{OxcModuleTransformer, RuntimeBundleEmitter, TokioFileSystemService};
use crate::utils::{KumiError, Logger, Result, Timer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main build service implementation
pub struct KumiBuildService {
    fs_service: Arc<dyn FileSystemService>,
    transformer: Arc<dyn ModuleTransformer>,
    renderer: Arc<dyn BundleRenderer>,
}

impl KumiBuildService {
    pub fn new(
        fs_service: Arc<dyn FileSystemService>,
        transformer: Arc<dyn ModuleTransformer>,
        renderer: Arc<dyn BundleRenderer>,
    ) -> Self {
        Self {
            fs_service,
            transformer,
            renderer,
        }
    }

    /// Real file system, oxc transformer and the runtime bundle emitter.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(TokioFileSystemService),
            Arc::new(OxcModuleTransformer::new()),
            Arc::new(RuntimeBundleEmitter::new()),
        )
    }

    /// Builds the module graph for `config` without rendering or writing anything.
    pub async fn build_graph(&self, config: &BuildConfig) -> Result<ModuleGraph> {
        let entry = Self::entry(config)?;
        let root = absolute_path(&config.root)?;

        let extractor = AssetExtractor::new(self.fs_service.clone(), self.transformer.clone());
        let mut builder = GraphBuilder::new(extractor, GraphOptions::from(config));
        builder.build_graph(entry, &root).await
    }

    fn entry(config: &BuildConfig) -> Result<&str> {
        config
            .entry
            .as_deref()
            .filter(|entry| !entry.trim().is_empty())
            .ok_or_else(|| KumiError::config("no entry point configured (set `entry` or pass --entry)"))
    }

    fn output_file(config: &BuildConfig, root: &Path) -> Result<PathBuf> {
        if config.output.filename.trim().is_empty() {
            return Err(KumiError::config("output filename must not be empty"));
        }
        Ok(normalize_path(&root.join(config.output.file())))
    }
}

#[async_trait::async_trait]
impl BuildService for KumiBuildService {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult> {
        let timer = Timer::start("Build");

        let entry = Self::entry(config)?;
        let root = absolute_path(&config.root)?;
        let output_path = Self::output_file(config, &root)?;

        Logger::build_start(entry, &root, &output_path);
        if config.module_identity == ModuleIdentity::PerImport {
            Logger::warn("per-import module identity: repeated imports are bundled more than once");
        }
        Logger::debug(&format!("Resolving imports with {:?} strategy", config.resolve_strategy));

        let graph = self.build_graph(config).await?;
        let bundle = self.renderer.render(&graph)?;

        // nothing touches the disk until the whole bundle exists
        self.fs_service.write_file(&output_path, &bundle).await?;

        let build_time = timer.elapsed();
        Logger::build_complete(graph.len(), bundle.len(), build_time, &output_path);

        Ok(BuildResult {
            graph,
            output_file: OutputFile {
                path: output_path,
                size: bundle.len(),
                content: bundle,
            },
            build_time,
        })
    }
}
