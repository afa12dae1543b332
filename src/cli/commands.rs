use crate::core::{interfaces::BuildService, models::*, KumiBuildService};
use crate::utils::{CliOverrides, ConfigLoader, KumiError, Logger, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kumi")]
#[command(about = "kumi - bundle an ES module entry point into one script", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the bundle
    Build(BuildArgs),
    /// Print the module graph as JSON without writing a bundle
    Graph(BuildArgs),
    /// Show bundler information
    Info,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Project root; relative imports and the entry are resolved from here
    #[arg(short, long, default_value = ".")]
    pub root: String,
    /// Entry module, relative to the root
    #[arg(short, long)]
    pub entry: Option<String>,
    /// Output directory
    #[arg(short, long)]
    pub outdir: Option<String>,
    /// Output file name
    #[arg(short, long)]
    pub filename: Option<String>,
    /// Resolve every import against the root. By default imports resolve
    /// relative to the importing file
    #[arg(long)]
    pub base_dir_resolution: bool,
    /// Give every import occurrence its own module and id, even for the same
    /// file; cyclic imports then stop with an error at `maxModules`. By
    /// default a file is one module shared by all its importers
    #[arg(long)]
    pub per_import: bool,
}

impl BuildArgs {
    fn to_config(&self) -> Result<BuildConfig> {
        let root = PathBuf::from(&self.root);
        let file_config = ConfigLoader::load_from_file(&root)?;

        let overrides = CliOverrides {
            entry: self.entry.clone(),
            outdir: self.outdir.clone(),
            filename: self.filename.clone(),
            resolve_strategy: self.base_dir_resolution.then_some(ResolveStrategy::BaseDir),
            module_identity: self.per_import.then_some(ModuleIdentity::PerImport),
        };

        Ok(ConfigLoader::merge_with_cli(file_config, root, overrides))
    }
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build(args) => self.handle_build_command(&args).await,
            Commands::Graph(args) => self.handle_graph_command(&args).await,
            Commands::Info => self.handle_info_command(),
        }
    }

    async fn handle_build_command(&self, args: &BuildArgs) -> Result<()> {
        let config = args.to_config()?;
        let service = KumiBuildService::with_defaults();

        match service.build(&config).await {
            Ok(_) => Ok(()),
            Err(e) => {
                Logger::error("Build failed, no bundle written");
                Err(e)
            }
        }
    }

    async fn handle_graph_command(&self, args: &BuildArgs) -> Result<()> {
        let config = args.to_config()?;
        let graph = KumiBuildService::with_defaults().build_graph(&config).await?;

        let json = serde_json::to_string_pretty(graph.assets())
            .map_err(|e| KumiError::template(format!("cannot serialize module graph: {}", e)))?;
        println!("{}", json);
        Ok(())
    }

    fn handle_info_command(&self) -> Result<()> {
        Logger::info(&format!("📦 kumi v{}", env!("CARGO_PKG_VERSION")));
        Logger::info("══════════════════════════════════════");
        Logger::info("Bundles an ES module entry point into a single script");
        Logger::info("");
        Logger::info("🎯 Features:");
        Logger::info("  • import/export rewriting with the oxc parser");
        Logger::info("  • breadth-first module graph with integer module ids");
        Logger::info("  • cycle-safe runtime loader with per-module require mappings");
        Logger::info("  • kumi.config.json with CLI overrides");
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
