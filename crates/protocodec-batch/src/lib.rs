//! # protocodec-batch
//!
//! High-throughput batch decoding of many encoded records of one type.
//!
//! ## Features
//! - Memory-bounded chunking (default 10,000 payloads per chunk)
//! - CPU-parallel decoding via Rayon, optionally on a dedicated pool
//! - Progress callbacks (for progress bars / ETAs)
//! - Three error modes: Skip, Collect, Throw
//!
//! ## Usage
//! ```no_run
//! use protocodec_batch::{BatchEngine, BatchRequest, ErrorMode};
//!
//! // let engine = BatchEngine::new(codec);
//! // let result = engine.decode(
//! //     BatchRequest::new("cronos.TokenMapping", payloads).error_mode(ErrorMode::Collect),
//! // )?;
//! ```

pub mod engine;
pub mod request;

pub use engine::{BatchEngine, BatchResult};
pub use request::{BatchRequest, ErrorMode, DEFAULT_CHUNK_SIZE};
