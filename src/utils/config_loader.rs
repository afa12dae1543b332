use crate::core::models::{BuildConfig, ModuleIdentity, OutputConfig, ResolveStrategy};
use crate::core::models::{default_max_modules, default_resolve_extensions};
use crate::utils::{KumiError, Logger, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "kumi.config.json";

/// Configuration file format (kumi.config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KumiConfig {
    /// Entry point file (e.g., "src/main.js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,

    /// "importer" (default) or "baseDir"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_strategy: Option<ResolveStrategy>,

    /// "perPath" (default) or "perImport"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_identity: Option<ModuleIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_extensions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_modules: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Values given on the command line. `None` means "not passed".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub entry: Option<String>,
    pub outdir: Option<String>,
    pub filename: Option<String>,
    pub resolve_strategy: Option<ResolveStrategy>,
    pub module_identity: Option<ModuleIdentity>,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `kumi.config.json` in the project root, if present
    pub fn load_from_file(root: &Path) -> Result<Option<KumiConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path).map_err(KumiError::Io)?;

        let config: KumiConfig = serde_json::from_str(&content).map_err(|e| {
            KumiError::config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(Some(config))
    }

    /// Merge file config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(file_config: Option<KumiConfig>, root: PathBuf, cli: CliOverrides) -> BuildConfig {
        let base = file_config.unwrap_or_default();
        let output = base.output.unwrap_or_default();

        // Determine output directory (CLI > config file > default)
        let outdir = cli
            .outdir
            .or(output.path)
            .unwrap_or_else(|| "dist".to_string());

        // Resolve outdir relative to root if it's a relative path
        let resolved_outdir = if Path::new(&outdir).is_absolute() {
            PathBuf::from(outdir)
        } else {
            root.join(outdir)
        };

        BuildConfig {
            root,
            entry: cli.entry.or(base.entry),
            output: OutputConfig {
                path: resolved_outdir,
                filename: cli
                    .filename
                    .or(output.filename)
                    .unwrap_or_else(|| OutputConfig::default().filename),
            },
            resolve_strategy: cli
                .resolve_strategy
                .or(base.resolve_strategy)
                .unwrap_or_default(),
            module_identity: cli
                .module_identity
                .or(base.module_identity)
                .unwrap_or_default(),
            resolve_extensions: base
                .resolve_extensions
                .unwrap_or_else(default_resolve_extensions),
            max_modules: base.max_modules.unwrap_or_else(default_max_modules),
        }
    }
}
