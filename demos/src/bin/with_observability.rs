//! # with_observability
//!
//! Demonstrates ProtoCodec metrics and structured logging via
//! `protocodec-observability`.
//!
//! Run with:
//! ```sh
//! cargo run --bin with_observability
//!
//! # With JSON logging:
//! LOG_JSON=1 cargo run --bin with_observability
//! ```

use anyhow::Result;
use protocodec_cosmos::bundled_codec;
use protocodec_observability::{init_tracing, CodecMetrics, LogConfig};
use std::time::Instant;
use tracing::{info, warn};

fn main() -> Result<()> {
    // ── 1. Initialise structured logging ──────────────────────────────────────
    let log_config = LogConfig {
        level: "info".into(),
        json: std::env::var("LOG_JSON").is_ok(),
        ..LogConfig::default()
    }
    .with_component("protocodec-core", "trace")
    .with_component("protocodec-registry", "warn");
    init_tracing(&log_config)?;

    info!(
        log_json = log_config.json,
        directives = %log_config.directives(),
        "ProtoCodec observability demo starting"
    );

    // ── 2. Metrics on the global meter provider ──────────────────────────────
    let metrics = CodecMetrics::global();
    let codec = bundled_codec()?;

    let record = codec.from_json(
        "cronos.GenesisState",
        &serde_json::json!({
            "params": { "ibcCroDenom": "ibc/6B5A", "ibcTimeout": 86400 },
            "externalContracts": [{ "denom": "basecro", "contract": "0xAbC123" }],
        }),
    )?;
    let bytes = codec.encode(&record)?;
    metrics.record_encoded(record.type_name());

    // A good payload, a payload with an unknown trailing field, and a broken one.
    let mut with_unknown = bytes.to_vec();
    with_unknown.extend_from_slice(&[0xf8, 0x06, 0x01]);
    let inputs: [(&str, Vec<u8>); 3] = [
        ("valid", bytes.to_vec()),
        ("unknown field", with_unknown),
        ("truncated", bytes[..bytes.len() - 3].to_vec()),
    ];

    for (label, input) in &inputs {
        let started = Instant::now();
        let result = codec.decode("cronos.GenesisState", input);
        metrics.observe_decode("cronos.GenesisState", started, &result);
        match result {
            Ok(r) => info!(label, record = %r, "decoded"),
            Err(e) => warn!(label, error = %e, kind = %e.kind(), "decode failed"),
        }
    }
    metrics.record_batch(inputs.len());

    info!("done; install an OpenTelemetry MeterProvider to export the recorded metrics");
    Ok(())
}
