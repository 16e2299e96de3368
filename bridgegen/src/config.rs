//! `bridgegen.toml` loading.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "bridgegen.toml";

/// Optional project configuration. Every value may be overridden by a flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathsConfig,
    pub patterns: PatternsConfig,
    pub hash_table: HashTableConfig,

    /// Directory of the file this was read from.
    #[serde(skip)]
    base: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub templates: Option<PathBuf>,
    pub dist: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternsConfig {
    pub idl: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashTableConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

impl Config {
    /// Read the explicit `path`, or `<source>/bridgegen.toml` when present.
    pub fn locate(path: Option<&Path>, source: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::open(path),
            None => {
                let default = source.join(CONFIG_FILE);
                if default.is_file() {
                    Self::open(&default)
                } else {
                    Ok(Self {
                        base: source.to_path_buf(),
                        ..Self::default()
                    })
                }
            }
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;
        config.base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Template directory, relative to the configuration file.
    pub fn templates(&self) -> Option<PathBuf> {
        self.paths.templates.as_ref().map(|p| self.base.join(p))
    }

    /// Output directory, relative to the configuration file.
    pub fn dist(&self) -> Option<PathBuf> {
        self.paths.dist.as_ref().map(|p| self.base.join(p))
    }
}
