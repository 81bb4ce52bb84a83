//! Project configuration model and loader.
//!
//! ```json
//! {
//!   "frontend-assets": [
//!     {
//!       "source": { "type": "http", "url": "https://cdn.example.com/{environment}.tar.gz" },
//!       "target": { "type": "archive", "path": "public/assets", "base": "dist" },
//!       "vcs": { "type": "gitlab", "project-id": 42, "access-token": "…" },
//!       "environments": { "map": { "develop": { "transformer": "static", "options": { "value": "nightly" } } }, "merge": true }
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::definition::KEY_PATH;
use crate::error::{io_err, CoreError};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "assets.json";

/// Root of the configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "frontend-assets", default)]
    pub assets: Vec<AssetConfig>,
}

/// One asset definition: where to fetch, where to place, how to check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub source: Map<String, Value>,
    #[serde(default)]
    pub target: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<Map<String, Value>>,
    #[serde(default)]
    pub environments: EnvironmentsConfig,
}

/// User-provided environment map and whether it extends the built-in one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
    #[serde(default)]
    pub map: Map<String, Value>,
    #[serde(default)]
    pub merge: bool,
}

impl Config {
    /// Resolve relative target paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for asset in &mut self.assets {
            let Some(Value::String(path)) = asset.target.get(KEY_PATH) else {
                continue;
            };
            let path = PathBuf::from(path);
            if path.is_relative() {
                let absolute = base.join(path).to_string_lossy().into_owned();
                asset.target.insert(KEY_PATH.into(), Value::String(absolute));
            }
        }
    }
}

/// `<dir>/assets.json`; no I/O.
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
}

/// Load and parse the configuration at `path`, resolving relative target
/// paths against the file's directory.
pub fn load(path: &Path) -> Result<Config, CoreError> {
    if !path.exists() {
        return Err(CoreError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_json::from_str(&contents).map_err(|source| {
        CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    tracing::debug!("loaded {} asset definition(s) from {}", config.assets.len(), path.display());
    Ok(config)
}
