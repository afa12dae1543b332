use crate::core::{interfaces::FileSystemService, models::ResolveStrategy};
use crate::utils::{KumiError, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Maps import specifiers to absolute, normalized file paths.
pub struct PathResolver {
    strategy: ResolveStrategy,
    base_dir: PathBuf,
    extensions: Vec<String>,
}

impl PathResolver {
    /// A relative base directory is taken from the current working directory.
    pub fn new(
        strategy: ResolveStrategy,
        base_dir: &Path,
        extensions: &[String],
    ) -> Result<Self> {
        Ok(Self {
            strategy,
            base_dir: absolute_path(base_dir)?,
            extensions: extensions.to_vec(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The entry is always taken relative to the base directory.
    pub fn resolve_entry(&self, entry: &str, fs: &dyn FileSystemService) -> PathBuf {
        self.first_existing(normalize_path(&self.base_dir.join(entry)), fs)
    }

    pub fn resolve(&self, specifier: &str, importer: &Path, fs: &dyn FileSystemService) -> PathBuf {
        let dir = match self.strategy {
            ResolveStrategy::BaseDir => self.base_dir.as_path(),
            ResolveStrategy::Importer => importer.parent().unwrap_or(&self.base_dir),
        };
        self.first_existing(normalize_path(&dir.join(specifier)), fs)
    }

    /// Returns the first existing candidate, or the path itself so the read
    /// that follows reports the missing file.
    fn first_existing(&self, path: PathBuf, fs: &dyn FileSystemService) -> PathBuf {
        if fs.file_exists(&path) {
            return path;
        }

        self.extensions
            .iter()
            .map(|ext| {
                let mut candidate: OsString = path.clone().into_os_string();
                candidate.push(ext);
                PathBuf::from(candidate)
            })
            .find(|candidate| fs.file_exists(candidate))
            .unwrap_or(path)
    }
}

pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir().map_err(KumiError::Io)?;
    Ok(normalize_path(&cwd.join(path)))
}

/// Folds `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }

    normalized
}
