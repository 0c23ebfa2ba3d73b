//! ProtoCodec metrics definitions.
//!
//! All metrics use OpenTelemetry conventions.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use protocodec_core::ErrorKind;
use std::time::Instant;

pub const METER_NAME: &str = "protocodec";

/// Central metrics handle for ProtoCodec.
#[derive(Clone)]
pub struct CodecMetrics {
    pub records_encoded: Counter<u64>,
    pub records_decoded: Counter<u64>,
    pub decode_errors: Counter<u64>,
    pub decode_latency_ms: Histogram<f64>,
    pub batch_size: Histogram<u64>,
}

impl CodecMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            records_encoded: meter
                .u64_counter("protocodec.records_encoded")
                .with_description("Total number of records encoded to wire bytes")
                .build(),
            records_decoded: meter
                .u64_counter("protocodec.records_decoded")
                .with_description("Total number of records successfully decoded")
                .build(),
            decode_errors: meter
                .u64_counter("protocodec.decode_errors")
                .with_description("Payloads that failed to decode")
                .build(),
            decode_latency_ms: meter
                .f64_histogram("protocodec.decode_latency_ms")
                .with_description("Time to decode a single record in milliseconds")
                .build(),
            batch_size: meter
                .u64_histogram("protocodec.batch_size")
                .with_description("Number of payloads in a batch decode request")
                .build(),
        }
    }

    /// Instruments on the global meter provider.
    pub fn global() -> Self {
        Self::new(&global::meter(METER_NAME))
    }

    pub fn record_encoded(&self, type_name: &str) {
        self.records_encoded
            .add(1, &[KeyValue::new("type", type_name.to_string())]);
    }

    pub fn record_decoded(&self, type_name: &str) {
        self.records_decoded
            .add(1, &[KeyValue::new("type", type_name.to_string())]);
    }

    pub fn record_error(&self, type_name: &str, kind: ErrorKind) {
        self.decode_errors.add(
            1,
            &[
                KeyValue::new("type", type_name.to_string()),
                KeyValue::new("error_kind", kind.to_string()),
            ],
        );
    }

    pub fn record_latency(&self, ms: f64, type_name: &str) {
        self.decode_latency_ms
            .record(ms, &[KeyValue::new("type", type_name.to_string())]);
    }

    pub fn record_batch(&self, size: usize) {
        self.batch_size.record(size as u64, &[]);
    }

    /// Record the outcome and latency of one decode.
    pub fn observe_decode<T>(
        &self,
        type_name: &str,
        started: Instant,
        result: &Result<T, protocodec_core::CodecError>,
    ) {
        self.record_latency(started.elapsed().as_secs_f64() * 1_000.0, type_name);
        match result {
            Ok(_) => self.record_decoded(type_name),
            Err(e) => self.record_error(type_name, e.kind()),
        }
    }
}

impl std::fmt::Debug for CodecMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecMetrics").finish_non_exhaustive()
    }
}
