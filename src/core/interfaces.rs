use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::Path;

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Turns ES module source into `require`/`exports` code plus its import list.
pub trait ModuleTransformer: Send + Sync {
    fn transform(&self, source: &str, path: &Path) -> Result<TransformOutput>;
}

/// Renders a finished module graph into bundle text. Must be pure.
pub trait BundleRenderer: Send + Sync {
    fn render(&self, graph: &ModuleGraph) -> Result<String>;
}

/// Build service interface
#[async_trait]
pub trait BuildService: Send + Sync {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult>;
}
