use crate::core::interfaces::{FileSystemService, ModuleTransformer};
use crate::core::models::{Asset, ModuleId};
use crate::utils::{Logger, Result};
use std::path::Path;
use std::sync::Arc;

/// Hands out module ids for one build, starting at 0.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: ModuleId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ModuleId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Reads a file, normalizes it and wraps the result in a fresh [`Asset`].
pub struct AssetExtractor {
    fs: Arc<dyn FileSystemService>,
    transformer: Arc<dyn ModuleTransformer>,
    ids: IdAllocator,
}

impl AssetExtractor {
    pub fn new(fs: Arc<dyn FileSystemService>, transformer: Arc<dyn ModuleTransformer>) -> Self {
        Self {
            fs,
            transformer,
            ids: IdAllocator::new(),
        }
    }

    pub fn file_system(&self) -> &dyn FileSystemService {
        self.fs.as_ref()
    }

    pub fn allocated(&self) -> usize {
        self.ids.allocated()
    }

    pub fn reset_ids(&mut self) {
        self.ids.reset();
    }

    /// The id is taken only once the file has been read and transformed, so a
    /// failed extraction leaves the counter untouched.
    pub async fn extract(&mut self, path: &Path) -> Result<Asset> {
        let source = self.fs.read_file(path).await?;
        let output = self.transformer.transform(&source, path)?;

        let id = self.ids.next_id();
        Logger::module_discovered(id, path);

        Ok(Asset::new(id, path.to_path_buf(), output.code, output.imports))
    }
}
