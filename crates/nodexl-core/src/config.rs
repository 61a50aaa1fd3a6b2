//! `nodexl.toml` configuration.
//!
//! Resolution order for [`load_config`]:
//!
//! 1. an explicit path (the CLI's `--config`),
//! 2. `./nodexl.toml`,
//! 3. `<config dir>/nodexl/config.toml`,
//! 4. built-in defaults.
//!
//! `NODEXL_SNAP_PATH` overrides `snap.executable` regardless of source.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`NodexlConfig`].
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodexlConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Metrics run by `nodexl metrics` when no `--metric` flag is given.
    #[serde(default = "default_metrics")]
    pub default_metrics: Vec<String>,
    /// Sort connected components largest first.
    #[serde(default = "default_true")]
    pub components_descending: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            default_metrics: default_metrics(),
            components_descending: default_true(),
        }
    }
}

/// Where PageRank comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SnapBackendKind {
    /// Power iteration inside this process.
    #[default]
    InProcess,
    /// The external SNAP executable.
    Executable,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapConfig {
    #[serde(default)]
    pub backend: SnapBackendKind,
    /// Path to the SNAP graph-metrics executable.
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimal places used for metric values in human output.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_precision() -> usize {
    4
}

fn default_metrics() -> Vec<String> {
    [
        "degree",
        "betweenness",
        "closeness",
        "eigenvector",
        "clustering",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Parse a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<NodexlConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<NodexlConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Locate and load the effective configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] if a discovered file cannot be read or parsed. A
/// missing file is not an error.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<NodexlConfig, ConfigError> {
    let mut config = match discover_config_path(explicit, working_dir) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config_file(&path)?
        }
        None => NodexlConfig::default(),
    };

    if let Some(path) = env::var_os("NODEXL_SNAP_PATH") {
        config.snap.executable = Some(PathBuf::from(path));
    }

    Ok(config)
}

fn discover_config_path(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = working_dir.join("nodexl.toml");
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("nodexl/config.toml");
    user.exists().then_some(user)
}
