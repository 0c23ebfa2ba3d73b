//! `BatchEngine`: chunked, parallel decoding of many payloads of one type.

use crate::request::{BatchRequest, ErrorMode};
use bytes::Bytes;
use protocodec_core::{BatchDecodeError, Codec, CodecError, Record};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a batch decode job.
#[derive(Debug)]
pub struct BatchResult {
    /// Successfully decoded records, in input order
    pub records: Vec<Record>,
    /// (original_index, error) pairs, only populated in Collect mode
    pub errors: Vec<(usize, CodecError)>,
    /// Total payloads processed
    pub total_input: usize,
}

impl BatchResult {
    pub fn success_rate(&self) -> f64 {
        if self.total_input == 0 {
            return 1.0;
        }
        self.records.len() as f64 / self.total_input as f64
    }
}

/// Batch decode engine.
#[derive(Debug, Clone)]
pub struct BatchEngine {
    codec: Arc<Codec>,
}

impl BatchEngine {
    pub fn new(codec: Arc<Codec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Execute a batch decode request.
    pub fn decode(&self, req: BatchRequest) -> Result<BatchResult, BatchDecodeError> {
        self.codec
            .schema(&req.type_name)
            .map_err(BatchDecodeError::Schema)?;

        if req.concurrency == 0 {
            return self.run(&req);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(req.concurrency)
            .build()
            .map_err(|e| BatchDecodeError::Other(format!("cannot build thread pool: {e}")))?;
        pool.install(|| self.run(&req))
    }

    fn run(&self, req: &BatchRequest) -> Result<BatchResult, BatchDecodeError> {
        let total_input = req.payloads.len();
        let chunk_size = req.chunk_size.max(1);
        info!(
            type_name = %req.type_name,
            total = total_input,
            chunk_size,
            mode = ?req.error_mode,
            "batch decode started"
        );

        let mut records = Vec::with_capacity(total_input);
        let mut errors = Vec::new();
        let mut global_offset = 0usize;

        for chunk in req.payloads.chunks(chunk_size) {
            let results = self.decode_chunk(&req.type_name, chunk);

            for (local_idx, result) in results.into_iter().enumerate() {
                match result {
                    Ok(record) => records.push(record),
                    Err(err) => match req.error_mode {
                        ErrorMode::Skip => {}
                        ErrorMode::Collect => errors.push((global_offset + local_idx, err)),
                        ErrorMode::Throw => {
                            return Err(BatchDecodeError::ItemFailed {
                                index: global_offset + local_idx,
                                source: err,
                            });
                        }
                    },
                }
            }

            global_offset += chunk.len();
            debug!(processed = global_offset, total = total_input, "chunk decoded");
            if let Some(cb) = &req.on_progress {
                cb(global_offset, total_input);
            }
        }

        info!(
            decoded = records.len(),
            errors = errors.len(),
            skipped = total_input - records.len() - errors.len(),
            "batch decode complete"
        );

        Ok(BatchResult {
            records,
            errors,
            total_input,
        })
    }

    // `collect` on an indexed parallel iterator keeps input order.
    fn decode_chunk(&self, type_name: &str, chunk: &[Bytes]) -> Vec<Result<Record, CodecError>> {
        chunk
            .par_iter()
            .map(|payload| self.codec.decode(type_name, payload))
            .collect()
    }
}
