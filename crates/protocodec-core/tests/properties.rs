//! Property tests for the record codec: round-trip identity, default
//! omission, unknown-tag tolerance, repeated order and overflow rejection.

use proptest::prelude::*;
use protocodec_core::{
    Codec, ErrorKind, FieldDef, MessageSchema, Partial, PartialValue, Record, SafeIntegers,
    ScalarType, SchemaSet, Value, WireType, WireWriter, MAX_SAFE_INTEGER,
};
use std::sync::Arc;

fn schemas() -> SchemaSet {
    let set = SchemaSet::new()
        .with_message(
            MessageSchema::new("test.Inner")
                .with_field(FieldDef::scalar("label", 1, ScalarType::String))
                .with_field(FieldDef::scalar("weight", 2, ScalarType::Sint64)),
        )
        .with_message(
            MessageSchema::new("test.AllTypes")
                .with_field(FieldDef::scalar("f_double", 1, ScalarType::Double))
                .with_field(FieldDef::scalar("f_float", 2, ScalarType::Float))
                .with_field(FieldDef::scalar("f_int32", 3, ScalarType::Int32))
                .with_field(FieldDef::scalar("f_int64", 4, ScalarType::Int64))
                .with_field(FieldDef::scalar("f_uint32", 5, ScalarType::Uint32))
                .with_field(FieldDef::scalar("f_uint64", 6, ScalarType::Uint64))
                .with_field(FieldDef::scalar("f_sint32", 7, ScalarType::Sint32))
                .with_field(FieldDef::scalar("f_sint64", 8, ScalarType::Sint64))
                .with_field(FieldDef::scalar("f_fixed32", 9, ScalarType::Fixed32))
                .with_field(FieldDef::scalar("f_fixed64", 10, ScalarType::Fixed64))
                .with_field(FieldDef::scalar("f_sfixed32", 11, ScalarType::Sfixed32))
                .with_field(FieldDef::scalar("f_sfixed64", 12, ScalarType::Sfixed64))
                .with_field(FieldDef::scalar("f_bool", 13, ScalarType::Bool))
                .with_field(FieldDef::scalar("f_string", 14, ScalarType::String))
                .with_field(FieldDef::scalar("f_bytes", 15, ScalarType::Bytes))
                .with_field(FieldDef::scalar("nonces", 16, ScalarType::Uint64).repeated())
                .with_field(FieldDef::scalar("deltas", 17, ScalarType::Sint32).repeated().unpacked())
                .with_field(FieldDef::scalar("topics", 18, ScalarType::String).repeated())
                .with_field(FieldDef::message("inner", 19, "test.Inner"))
                .with_field(FieldDef::message("items", 20, "test.Inner").repeated()),
        )
        .with_message(
            MessageSchema::new("cronos.TokenMapping")
                .with_field(FieldDef::scalar("denom", 1, ScalarType::String))
                .with_field(FieldDef::scalar("contract", 2, ScalarType::String)),
        )
        .with_message(
            MessageSchema::new("test.ConvertEnabled")
                .with_field(FieldDef::scalar("denom", 1, ScalarType::String))
                .with_field(FieldDef::scalar("enabled", 2, ScalarType::Bool)),
        );
    set.validate().expect("test schemas are valid");
    set
}

fn codec() -> Codec {
    Codec::new(Arc::new(schemas()))
}

fn inner_partial() -> impl Strategy<Value = Partial> {
    (".{0,12}", any::<i64>()).prop_map(|(label, weight)| {
        Partial::new().set("label", label).set("weight", weight)
    })
}

/// Doubles including the values IEEE comparison gets wrong: NaN, -0.0 and
/// the infinities.
fn any_double() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => any::<f64>().prop_filter("finite", |f| f.is_finite()),
        1 => Just(f64::NAN),
        1 => Just(-0.0),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn any_float() -> impl Strategy<Value = f32> {
    prop_oneof![
        6 => any::<f32>().prop_filter("finite", |f| f.is_finite()),
        1 => Just(f32::NAN),
        1 => Just(-0.0),
        1 => Just(f32::INFINITY),
        1 => Just(f32::NEG_INFINITY),
    ]
}

prop_compose! {
    fn all_types()(
        f_double in any_double(),
        f_float in any_float(),
        f_int32 in any::<i32>(),
        f_int64 in any::<i64>(),
        f_uint32 in any::<u32>(),
        f_uint64 in any::<u64>(),
        f_sint32 in any::<i32>(),
        f_sint64 in any::<i64>(),
        f_fixed32 in any::<u32>(),
        f_fixed64 in any::<u64>(),
        f_sfixed32 in any::<i32>(),
        f_sfixed64 in any::<i64>(),
        f_bool in any::<bool>(),
        f_string in "\\PC{0,24}",
        f_bytes in proptest::collection::vec(any::<u8>(), 0..32),
        nonces in proptest::collection::vec(any::<u64>(), 0..8),
        deltas in proptest::collection::vec(any::<i32>(), 0..8),
        topics in proptest::collection::vec("[a-f0-9]{0,16}", 0..6),
        inner in inner_partial(),
        items in proptest::collection::vec(inner_partial(), 0..4),
    ) -> Partial {
        Partial::new()
            .set("f_double", f_double)
            .set("f_float", f_float)
            .set("f_int32", f_int32)
            .set("f_int64", f_int64)
            .set("f_uint32", f_uint32)
            .set("f_uint64", f_uint64)
            .set("f_sint32", f_sint32)
            .set("f_sint64", f_sint64)
            .set("f_fixed32", f_fixed32)
            .set("f_fixed64", f_fixed64)
            .set("f_sfixed32", f_sfixed32)
            .set("f_sfixed64", f_sfixed64)
            .set("f_bool", f_bool)
            .set("f_string", f_string)
            .set("f_bytes", f_bytes)
            .set("nonces", nonces.into_iter().map(PartialValue::from).collect::<Vec<_>>())
            .set("deltas", deltas.into_iter().map(PartialValue::from).collect::<Vec<_>>())
            .set("topics", topics.into_iter().map(PartialValue::from).collect::<Vec<_>>())
            .set("inner", inner)
            .set("items", items.into_iter().map(PartialValue::from).collect::<Vec<_>>())
    }
}

/// An unknown field entry (tag 99) of any wire type.
fn unknown_entry() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        any::<u64>().prop_map(|v| {
            let mut w = WireWriter::new();
            w.key(99, WireType::Varint).varint(v);
            w.as_slice().to_vec()
        }),
        any::<u64>().prop_map(|v| {
            let mut w = WireWriter::new();
            w.key(99, WireType::Fixed64).fixed64(v);
            w.as_slice().to_vec()
        }),
        any::<u32>().prop_map(|v| {
            let mut w = WireWriter::new();
            w.key(99, WireType::Fixed32).fixed32(v);
            w.as_slice().to_vec()
        }),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(|b| {
            let mut w = WireWriter::new();
            w.key(99, WireType::LengthDelimited).bytes(&b);
            w.as_slice().to_vec()
        }),
        any::<u64>().prop_map(|v| {
            let mut w = WireWriter::new();
            w.key(99, WireType::StartGroup)
                .key(1, WireType::Varint)
                .varint(v)
                .key(99, WireType::EndGroup);
            w.as_slice().to_vec()
        }),
    ]
}

proptest! {
    #[test]
    fn round_trip_identity(partial in all_types()) {
        let c = codec();
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        let bytes = c.encode(&record).unwrap();
        let decoded = c.decode("test.AllTypes", &bytes).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn encoding_is_deterministic(partial in all_types()) {
        let c = codec();
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        prop_assert_eq!(c.encode(&record).unwrap(), c.encode(&record).unwrap());
    }

    #[test]
    fn json_round_trip(partial in all_types()) {
        let c = codec();
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        let json = c.to_json(&record).unwrap();
        prop_assert_eq!(c.from_json("test.AllTypes", &json).unwrap(), record);
    }

    #[test]
    fn unknown_tags_are_ignored(
        partial in all_types(),
        extra in unknown_entry(),
        at_front in any::<bool>(),
    ) {
        let c = codec();
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        let bytes = c.encode(&record).unwrap();
        let mut with_extra = Vec::new();
        if at_front {
            with_extra.extend_from_slice(&extra);
            with_extra.extend_from_slice(&bytes);
        } else {
            with_extra.extend_from_slice(&bytes);
            with_extra.extend_from_slice(&extra);
        }
        prop_assert_eq!(
            c.decode("test.AllTypes", &with_extra).unwrap(),
            c.decode("test.AllTypes", &bytes).unwrap()
        );
    }

    #[test]
    fn repeated_order_preserved(
        nonces in proptest::collection::vec(any::<u64>(), 1..16),
        topics in proptest::collection::vec("[a-z]{1,8}", 1..16),
    ) {
        let c = codec();
        let partial = Partial::new()
            .set("nonces", nonces.iter().copied().map(PartialValue::from).collect::<Vec<_>>())
            .set("topics", topics.iter().cloned().map(PartialValue::from).collect::<Vec<_>>());
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        let decoded = c.decode("test.AllTypes", &c.encode(&record).unwrap()).unwrap();
        let got_nonces: Vec<u64> = decoded
            .get("nonces")
            .and_then(Value::as_list)
            .unwrap()
            .iter()
            .filter_map(Value::as_u64)
            .collect();
        let got_topics: Vec<&str> = decoded
            .get("topics")
            .and_then(Value::as_list)
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        prop_assert_eq!(got_nonces, nonces);
        prop_assert_eq!(got_topics, topics.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn safe_strategy_rejects_unsafe_uint64(v in (MAX_SAFE_INTEGER + 1)..=u64::MAX) {
        let c = codec().with_integers(Arc::new(SafeIntegers));
        let mut w = WireWriter::new();
        w.key(6, WireType::Varint).varint(v);
        let err = c.decode("test.AllTypes", w.as_slice()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn uint32_width_is_enforced(v in (u64::from(u32::MAX) + 1)..=u64::MAX) {
        let c = codec();
        let mut w = WireWriter::new();
        w.key(5, WireType::Varint).varint(v);
        let err = c.decode("test.AllTypes", w.as_slice()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn truncation_never_panics(partial in all_types(), cut in 0usize..64) {
        let c = codec();
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        let bytes = c.encode(&record).unwrap();
        let end = cut.min(bytes.len());
        let _ = c.decode("test.AllTypes", &bytes[..end]);
    }
}

#[test]
fn all_defaults_encode_to_nothing() {
    let c = codec();
    for name in ["test.AllTypes", "test.Inner", "cronos.TokenMapping"] {
        let record = c.default_record(name).unwrap();
        assert!(c.encode(&record).unwrap().is_empty(), "{name}");
        assert_eq!(c.decode(name, &[]).unwrap(), record);
    }
}

#[test]
fn token_mapping_wire_bytes() {
    let c = codec();
    let record: Record = c
        .from_partial(
            "cronos.TokenMapping",
            &Partial::new().set("denom", "basecro").set("contract", "0xAbC123"),
        )
        .unwrap();
    let bytes = c.encode(&record).unwrap();
    // "0xAbC123" is eight bytes long, so its length prefix is 0x08.
    let mut expected = vec![0x0a, 0x07];
    expected.extend_from_slice(b"basecro");
    expected.extend_from_slice(&[0x12, 0x08]);
    expected.extend_from_slice(b"0xAbC123");
    assert_eq!(bytes.as_ref(), expected.as_slice());
    assert_eq!(c.decode("cronos.TokenMapping", &expected).unwrap(), record);
}

#[test]
fn false_bool_is_omitted() {
    let c = codec();
    let record = c
        .from_partial(
            "test.ConvertEnabled",
            &Partial::new().set("denom", "basecro").set("enabled", false),
        )
        .unwrap();
    let bytes = c.encode(&record).unwrap();
    let mut expected = vec![0x0a, 0x07];
    expected.extend_from_slice(b"basecro");
    assert_eq!(bytes.as_ref(), expected.as_slice());
}

#[test]
fn hex_wire_vectors() {
    let c = codec();
    let cases: Vec<(Partial, &str)> = vec![
        (Partial::new().set("f_int32", -1i32), "18ffffffffffffffffff01"),
        (Partial::new().set("f_sint32", -2i32), "3803"),
        (Partial::new().set("f_double", f64::NAN), "09000000000000f87f"),
        (Partial::new().set("f_float", -0.0f32), "1500000080"),
        (
            Partial::new().set("nonces", vec![PartialValue::from(1u64), PartialValue::from(300u64)]),
            "82010301ac02",
        ),
    ];
    for (partial, expected) in cases {
        let record = c.from_partial("test.AllTypes", &partial).unwrap();
        assert_eq!(hex::encode(c.encode(&record).unwrap()), expected);
        let bytes = hex::decode(expected).unwrap();
        assert_eq!(c.decode("test.AllTypes", &bytes).unwrap(), record, "{expected}");
    }
}
