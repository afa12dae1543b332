use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Installs the global subscriber. `RUST_LOG` overrides the default filter.
    pub fn init() {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kumi=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    pub fn build_start(entry: &str, root: &Path, output: &Path) {
        info!("📦 kumi - bundling");
        info!("═══════════════════════════════════════");
        info!("🚪 Entry: {}", entry);
        info!("📁 Root: {}", root.display());
        info!("📄 Output: {}", output.display());
    }

    pub fn module_discovered(id: usize, path: &Path) {
        debug!("🔍 Module {}: {}", id, path.display());
    }

    pub fn dependency_resolved(specifier: &str, from: usize, to: usize) {
        debug!("🔗 {} -> '{}' -> {}", from, specifier, to);
    }

    pub fn build_complete(module_count: usize, bundle_size: usize, build_time: std::time::Duration, output: &Path) {
        info!("");
        info!("📊 Build Statistics:");
        info!("  • Modules bundled: {}", module_count);
        info!("  • Bundle size: {} bytes", bundle_size);
        info!("  • Build time: {:.2?}", build_time);
        info!("  • Output: {}", output.display());
        info!("");
        info!("✅ Bundle written");
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn error(msg: &str) {
        error!("❌ {}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
