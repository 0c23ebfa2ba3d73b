//! # encode_cronos
//!
//! Builds cronos module records three ways (partial, JSON, field by field),
//! encodes them to protobuf bytes and decodes them back.
//!
//! Run with:
//! ```sh
//! cargo run --bin encode_cronos
//! ```

use anyhow::Result;
use protocodec_core::{Partial, PartialValue, Value, WireReader};
use protocodec_cosmos::{bundled_codec, msgs::cronos, pack_any, EncodeObject};

fn main() -> Result<()> {
    let codec = bundled_codec()?;

    println!("ProtoCodec: cronos encode / decode");
    println!("═══════════════════════════════════════════════════════");

    // ── 1. Record built field by field ───────────────────────────────────────
    let mapping = codec
        .default_record("cronos.TokenMapping")?
        .with("denom", "basecro")?
        .with("contract", "0xAbC123")?;
    let bytes = codec.encode(&mapping)?;
    println!("\n{mapping}");
    println!("  wire: {}", hex::encode(&bytes));
    println!("  json: {}", codec.to_json(&mapping)?);

    // ── 2. Message from a partial, wrapped as an EncodeObject ────────────────
    let msg = EncodeObject::from_partial(
        &codec,
        cronos::MSG_CONVERT_VOUCHERS,
        &Partial::new().set("address", "crc1q").set(
            "coins",
            vec![PartialValue::from(
                Partial::new().set("denom", "basecro").set("amount", "100"),
            )],
        ),
    )?;
    let any = msg.to_any(&codec)?;
    println!("\n{} ", msg.type_url);
    println!("  wire: {}", hex::encode(msg.encode(&codec)?));
    println!("  any:  {}", codec.to_json(&any)?);

    // ── 3. JSON in, with coercions (string uint64, numeric bool) ─────────────
    let params = codec.from_json(
        "cronos.Params",
        &serde_json::json!({
            "ibcCroDenom": "ibc/6B5A",
            "ibcTimeout": "86400",
            "enableAutoDeployment": 1
        }),
    )?;
    println!("\n{params}");
    println!("  wire: {}", hex::encode(codec.encode(&params)?));

    // ── 4. Length-delimited stream of mappings ───────────────────────────────
    let mut stream = Vec::new();
    for (denom, contract) in [("basecro", "0x01"), ("gravity0x1", "0x02"), ("ibc/ATOM", "0x03")] {
        let r = codec
            .default_record("cronos.TokenMapping")?
            .with("denom", denom)?
            .with("contract", contract)?;
        stream.extend_from_slice(&codec.encode_delimited(&r)?);
    }
    println!("\nDelimited stream: {} bytes", stream.len());
    let mut reader = WireReader::new(&stream);
    while !reader.is_eof() {
        let r = codec.decode_delimited("cronos.TokenMapping", &mut reader)?;
        println!(
            "  {} -> {}",
            r.get("denom").and_then(Value::as_str).unwrap_or_default(),
            r.get("contract").and_then(Value::as_str).unwrap_or_default()
        );
    }

    // ── 5. A mapping packed into Any and back ────────────────────────────────
    let packed = pack_any(&codec, &mapping)?;
    let unpacked = protocodec_cosmos::unpack_any(&codec, &packed)?;
    assert_eq!(unpacked, mapping);
    println!("\nAny round trip OK ({})", protocodec_cosmos::any_type_url(&packed).unwrap_or("?"));

    Ok(())
}
