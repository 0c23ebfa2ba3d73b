//! Batch decode request configuration.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Controls how the batch engine reacts to individual decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Drop payloads that fail to decode.
    #[default]
    Skip,
    /// Return errors alongside the records that did decode.
    Collect,
    /// Abort the whole batch on the first error.
    Throw,
}

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Configuration for a batch decode job.
pub struct BatchRequest {
    /// Message type every payload is decoded as
    pub type_name: String,
    /// Encoded records, one per entry
    pub payloads: Vec<Bytes>,
    /// Number of Rayon workers (0 = the global pool)
    pub concurrency: usize,
    /// Max payloads per chunk
    pub chunk_size: usize,
    pub error_mode: ErrorMode,
    /// Called after each chunk with `(processed, total)`
    pub on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
}

impl BatchRequest {
    pub fn new(type_name: impl Into<String>, payloads: Vec<Bytes>) -> Self {
        Self {
            type_name: type_name.into(),
            payloads,
            concurrency: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            error_mode: ErrorMode::Skip,
            on_progress: None,
        }
    }

    /// Zero is treated as one.
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn concurrency(mut self, threads: usize) -> Self {
        self.concurrency = threads;
        self
    }

    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn on_progress<F: Fn(usize, usize) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRequest")
            .field("type_name", &self.type_name)
            .field("payloads", &self.payloads.len())
            .field("concurrency", &self.concurrency)
            .field("chunk_size", &self.chunk_size)
            .field("error_mode", &self.error_mode)
            .finish_non_exhaustive()
    }
}
