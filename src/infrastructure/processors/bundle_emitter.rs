use crate::core::{interfaces::BundleRenderer, models::*};
use crate::utils::{KumiError, Result, Timer};

const RUNTIME_HEAD: &str = r#"(function (modules) {
  var cache = {};

  function require(id) {
    if (cache[id]) {
      return cache[id].exports;
    }

    var fn = modules[id][0];
    var mapping = modules[id][1];
    var module = (cache[id] = { exports: {} });

    function localRequire(name) {
      if (!Object.prototype.hasOwnProperty.call(mapping, name)) {
        throw new Error("Cannot find module '" + name + "' from module " + id);
      }
      return require(mapping[name]);
    }

    fn(localRequire, module, module.exports);
    return module.exports;
  }

  require(0);
})({
"#;

const RUNTIME_TAIL: &str = "});\n";

/// Serializes a module graph into a self-executing script.
///
/// Every module becomes `id: [factory, mapping]`. The runtime caches a
/// module before running its factory, so a cyclic `require` gets the
/// partially filled `exports` object instead of recursing forever.
#[derive(Debug, Clone, Default)]
pub struct RuntimeBundleEmitter;

impl RuntimeBundleEmitter {
    pub fn new() -> Self {
        Self
    }

    fn check(graph: &ModuleGraph) -> Result<()> {
        if graph.is_empty() {
            return Err(KumiError::template("module graph is empty"));
        }

        for (index, asset) in graph.assets().iter().enumerate() {
            if asset.id != index {
                return Err(KumiError::template(format!(
                    "module at position {} has id {}",
                    index, asset.id
                )));
            }

            for dep in asset.deps.iter().filter(|d| !d.is_empty()) {
                match asset.mapping.get(dep) {
                    Some(&target) if target < graph.len() => {}
                    Some(&target) => {
                        return Err(KumiError::template(format!(
                            "'{}' in {} maps to unknown module {}",
                            dep,
                            asset.file_path.display(),
                            target
                        )));
                    }
                    None => {
                        return Err(KumiError::template(format!(
                            "'{}' in {} was never resolved",
                            dep,
                            asset.file_path.display()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn render_module(asset: &Asset, out: &mut String) -> Result<()> {
        let mapping = serde_json::to_string(&asset.mapping).map_err(|e| {
            KumiError::template(format!(
                "cannot serialize mapping of {}: {}",
                asset.file_path.display(),
                e
            ))
        })?;
        let location = asset.file_path.display().to_string().replace(['\n', '\r'], " ");

        out.push_str(&format!("  // {}\n", location));
        out.push_str(&format!("  {}: [\n", asset.id));
        out.push_str("    function (require, module, exports) {\n");
        out.push_str(&asset.code);
        if !asset.code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("    },\n");
        out.push_str(&format!("    {},\n", mapping));
        out.push_str("  ],\n");
        Ok(())
    }
}

impl BundleRenderer for RuntimeBundleEmitter {
    fn render(&self, graph: &ModuleGraph) -> Result<String> {
        let _timer = Timer::start("Bundle emission");
        Self::check(graph)?;

        let code_size: usize = graph.assets().iter().map(|a| a.code.len()).sum();
        let mut bundle = String::with_capacity(code_size + RUNTIME_HEAD.len() + graph.len() * 128);

        bundle.push_str("// kumi bundle\n");
        bundle.push_str(RUNTIME_HEAD);
        for asset in graph.assets() {
            Self::render_module(asset, &mut bundle)?;
        }
        bundle.push_str(RUNTIME_TAIL);

        Ok(bundle)
    }
}
