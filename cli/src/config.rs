//! `protocodec.yaml`: optional configuration file for the CLI.
//!
//! ```yaml
//! codec:
//!   integers: safe
//!   max_depth: 64
//!   json: { emit_defaults: false, int64_as_string: true }
//! log:
//!   level: info
//!   components: { protocodec-registry: debug }
//! ```

use anyhow::{Context, Result};
use protocodec_core::CodecConfig;
use protocodec_observability::LogConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub log: Option<LogConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("parse config file '{}'", path.display()))
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}
