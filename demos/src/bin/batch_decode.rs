//! # batch_decode
//!
//! Decodes a large batch of `ethermint.evm.v1.Log` payloads in parallel,
//! with some corrupted entries, using each error mode.
//!
//! Run with:
//! ```sh
//! cargo run --release --bin batch_decode
//! ```

use anyhow::Result;
use bytes::Bytes;
use protocodec_batch::{BatchEngine, BatchRequest, ErrorMode};
use protocodec_cosmos::bundled_codec;
use std::sync::Arc;
use std::time::Instant;

const TOTAL: usize = 200_000;
const CORRUPT_EVERY: usize = 1_000;

fn main() -> Result<()> {
    let codec = Arc::new(bundled_codec()?);

    let mut payloads = Vec::with_capacity(TOTAL);
    for i in 0..TOTAL {
        if i % CORRUPT_EVERY == CORRUPT_EVERY - 1 {
            // Length prefix runs past the end of the buffer.
            payloads.push(Bytes::from_static(b"\x0a\x40truncated"));
            continue;
        }
        let log = codec.from_json(
            "ethermint.evm.v1.Log",
            &serde_json::json!({
                "address": format!("0x{:040x}", i % 50),
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "blockNumber": 19_000_000 + i,
                "txIndex": i % 200,
                "index": i % 4,
            }),
        )?;
        payloads.push(codec.encode(&log)?);
    }

    println!("ProtoCodec: batch decode of {TOTAL} logs");
    println!("═══════════════════════════════════════════════════════");

    let engine = BatchEngine::new(codec);
    for mode in [ErrorMode::Skip, ErrorMode::Collect, ErrorMode::Throw] {
        let start = Instant::now();
        let req = BatchRequest::new("ethermint.evm.v1.Log", payloads.clone())
            .chunk_size(25_000)
            .error_mode(mode)
            .on_progress(|done, total| {
                if done == total {
                    println!("    progress: {done}/{total}");
                }
            });
        match engine.decode(req) {
            Ok(result) => {
                let secs = start.elapsed().as_secs_f64();
                println!(
                    "  {mode:?}: {} decoded, {} errors collected in {secs:.3}s ({:.0}/s)",
                    result.records.len(),
                    result.errors.len(),
                    TOTAL as f64 / secs
                );
                if let Some((index, err)) = result.errors.first() {
                    println!("    first error at #{index}: {err}");
                }
            }
            Err(e) => println!("  {mode:?}: aborted: {e}"),
        }
    }
    Ok(())
}
