//! # psdl_registry
//!
//! Demonstrates the PSDL parser and `MemoryRegistry` schema management:
//! custom message and service definitions layered over the bundled
//! schemas, reference checking, and the safe-integer strategy.
//!
//! Run with:
//! ```sh
//! cargo run --bin psdl_registry
//! ```

use anyhow::Result;
use protocodec_core::{Codec, SafeIntegers, SchemaRegistry};
use protocodec_registry::{load_bundled, MemoryRegistry, PsdlParser};
use std::sync::Arc;

// Multi-document PSDL: two messages and a service in one YAML string
const BRIDGE_PSDL: &str = r#"
message demo.bridge.Transfer:
  description: "A cross-chain transfer observed by the bridge relayer"
  fields:
    sender:    { tag: 1, type: string }
    receiver:  { tag: 2, type: string }
    amount:    { tag: 3, type: cosmos.base.v1beta1.Coin }
    sequence:  { tag: 4, type: uint64 }
    relayers:  { tag: 5, type: "string[]" }
    fee_bps:   { tag: 6, type: uint32, optional: true }
    checksums: { tag: 7, type: "fixed32[]", packed: false }
---
message demo.bridge.TransferAck:
  fields:
    sequence: { tag: 1, type: uint64 }
    ok:       { tag: 2, type: bool }
---
service demo.bridge.Relayer:
  methods:
    Submit: { input: demo.bridge.Transfer, output: demo.bridge.TransferAck }
"#;

fn main() -> Result<()> {
    println!("ProtoCodec: PSDL registry");
    println!("═══════════════════════════════════════════════════════");

    // ── 1. Parse ─────────────────────────────────────────────────────────────
    let defs = PsdlParser::parse_all(BRIDGE_PSDL)?;
    for def in &defs {
        println!("  parsed {}", def.name());
    }

    // ── 2. Register over the bundled schemas ─────────────────────────────────
    let registry = MemoryRegistry::new();
    let bundled = load_bundled(&registry)?;
    let custom = registry.load_str(BRIDGE_PSDL)?;
    registry.check_references()?;
    println!(
        "\n  {bundled} bundled + {custom} custom definitions, {} messages, {} services",
        registry.len(),
        registry.service_names().len()
    );

    let schema = registry
        .message_by_type_url("/demo.bridge.Transfer")
        .ok_or_else(|| anyhow::anyhow!("Transfer not registered"))?;
    println!("\n{}", serde_json::to_string_pretty(&schema.describe())?);

    // ── 3. Encode with the JS-safe integer strategy ─────────────────────────
    let codec = Codec::new(Arc::new(registry.clone())).with_integers(Arc::new(SafeIntegers));
    let transfer = serde_json::json!({
        "sender": "crc1sender",
        "receiver": "0xreceiver",
        "amount": { "denom": "basecro", "amount": "5000" },
        "sequence": 42,
        "relayers": ["r1", "r2"],
        "feeBps": 0,
        "checksums": [1, 2]
    });
    let record = codec.from_json("demo.bridge.Transfer", &transfer)?;
    println!("\n{record}");
    println!("  wire: {}", hex::encode(codec.encode(&record)?));

    let too_big = serde_json::json!({ "sequence": "18446744073709551615" });
    match codec.from_json("demo.bridge.Transfer", &too_big) {
        Ok(_) => println!("  unexpected: u64::MAX accepted under SafeIntegers"),
        Err(e) => println!("  u64::MAX rejected ({}): {e}", e.kind()),
    }

    // ── 4. Duplicate definitions are rejected ────────────────────────────────
    match registry.load_str(BRIDGE_PSDL) {
        Ok(n) => println!("  unexpected: {n} duplicate definitions accepted"),
        Err(e) => println!("  reload rejected: {e}"),
    }
    Ok(())
}
