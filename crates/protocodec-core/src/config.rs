//! Codec configuration.
//!
//! Deserializable from the `codec:` section of a `protocodec.yaml` file;
//! every field has a default so an empty section is valid.

use crate::numeric::IntegerMode;
use serde::{Deserialize, Serialize};

/// Default nesting limit for decode and JSON conversion.
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// 64-bit integer strategy.
    #[serde(default)]
    pub integers: IntegerMode,

    /// Maximum message nesting depth accepted by decode and JSON conversion.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub json: JsonOptions,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            integers: IntegerMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            json: JsonOptions::default(),
        }
    }
}

/// Options for the JSON form produced by `to_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Include fields at their default value. Absent optionals are always
    /// omitted.
    #[serde(default = "default_true")]
    pub emit_defaults: bool,

    /// Render 64-bit integers as decimal strings instead of numbers.
    #[serde(default)]
    pub int64_as_string: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            emit_defaults: true,
            int64_as_string: false,
        }
    }
}

impl JsonOptions {
    /// Omit default-valued fields.
    pub fn sparse() -> Self {
        Self {
            emit_defaults: false,
            ..Self::default()
        }
    }
}
