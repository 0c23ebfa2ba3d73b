//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Set the level for one crate, e.g. `("protocodec-core", "trace")`.
    pub fn with_component(mut self, component: impl Into<String>, level: impl Into<String>) -> Self {
        self.components.insert(component.into(), level.into());
        self
    }

    /// The `EnvFilter` directive string: `"info,protocodec_core=trace"`.
    pub fn directives(&self) -> String {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        let mut directives = self.level.clone();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Call once at application startup; a
/// second call returns an error and leaves the first subscriber in place.
/// Invalid directives fall back to `info`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}
