//! Optional TOML configuration file.
//!
//! ```toml
//! [source]
//! url = "http://explorer.local:8080"
//! timeout_secs = 5
//!
//! [render]
//! self_loops = "drop"        # drop | keep | reject
//! local_node = "strict"      # strict | first-match
//! delimiter = "-"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use meshview_collect::SelfLoopPolicy;
use meshview_core::{Error, LocalNodePolicy, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshviewConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default)]
    pub self_loops: Option<SelfLoopPolicy>,
    #[serde(default)]
    pub local_node: Option<LocalNodePolicy>,
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl MeshviewConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::from(err)
                .with_operation("cli::config")
                .with_context("path", path.display().to_string())
        })?;
        Self::from_toml(&text).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| {
            Error::config_invalid(err.message().to_string())
                .with_operation("cli::config")
                .set_source(err)
        })
    }
}
