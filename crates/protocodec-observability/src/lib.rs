//! # protocodec-observability
//!
//! OpenTelemetry-based observability for ProtoCodec.
//!
//! ## Built-in metrics
//! - `protocodec.records_encoded`   (counter, tagged with type)
//! - `protocodec.records_decoded`   (counter, tagged with type)
//! - `protocodec.decode_errors`     (counter, tagged with type + error_kind)
//! - `protocodec.decode_latency_ms` (histogram)
//! - `protocodec.batch_size`        (histogram)
//!
//! Instruments are created against the global `MeterProvider`; without an
//! installed provider they are no-ops.
//!
//! ## Structured logging
//! Text or JSON logs through `tracing-subscriber`, with log levels
//! configurable per component.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::CodecMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
