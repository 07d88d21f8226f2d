//! Property tests for `Value` coercions: every accessor is total and follows
//! the coercion table for arbitrary payloads.

use proptest::prelude::*;
use rowcast_core::{ColumnDecodable, ColumnEncodable, ColumnType, Value};

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i32>().prop_map(Value::Integer32),
        any::<i64>().prop_map(Value::Integer64),
        any::<f64>().prop_map(Value::Float),
        ".*".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Blob),
    ]
}

proptest! {
    #[test]
    fn accessors_never_panic(value in any_value()) {
        let _ = value.int32_value();
        let _ = value.int64_value();
        let _ = value.double_value();
        let _ = value.string_value();
        let _ = value.blob_value();
        let _ = value.to_string();
    }

    #[test]
    fn int64_narrows_to_low_bits(v in any::<i64>()) {
        let value = Value::Integer64(v);
        prop_assert_eq!(value.int32_value(), v as i32);
        prop_assert_eq!(value.int64_value(), v);
        prop_assert_eq!(value.string_value(), v.to_string());
    }

    #[test]
    fn int32_widens_verbatim(v in any::<i32>()) {
        let value = Value::Integer32(v);
        prop_assert_eq!(value.int64_value(), i64::from(v));
        prop_assert_eq!(value.double_value(), f64::from(v));
        prop_assert_eq!(value.blob_value(), v.to_string().into_bytes());
    }

    #[test]
    fn finite_float_text_round_trips(v in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let text = Value::Float(v).string_value();
        prop_assert_eq!(text.parse::<f64>().unwrap(), v);
        prop_assert!(text.contains('.') || text.contains('e'));
    }

    #[test]
    fn numeric_text_parses(v in any::<i64>()) {
        let value = Value::Text(v.to_string());
        prop_assert_eq!(value.int64_value(), v);
        prop_assert_eq!(value.double_value(), v as f64);
    }

    #[test]
    fn non_numeric_text_reads_zero(s in "[a-zA-Z ]{1,16}") {
        let value = Value::Text(s);
        prop_assert_eq!(value.int32_value(), 0);
        prop_assert_eq!(value.int64_value(), 0);
    }

    #[test]
    fn blobs_are_never_numeric(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let value = Value::Blob(bytes.clone());
        prop_assert_eq!(value.int64_value(), 0);
        prop_assert_eq!(value.double_value(), 0.0);
        prop_assert_eq!(value.blob_value(), bytes.clone());
        let expected = String::from_utf8(bytes).unwrap_or_default();
        prop_assert_eq!(value.string_value(), expected);
    }

    #[test]
    fn text_bytes_are_utf8(s in ".*") {
        let value = Value::from(s.as_str());
        prop_assert_eq!(value.blob_value(), s.as_bytes().to_vec());
        prop_assert_eq!(value.column_type(), ColumnType::Text);
    }

    #[test]
    fn codable_round_trip_i64(v in any::<i64>()) {
        prop_assert_eq!(i64::from_value(&v.archived_value()), Some(v));
    }
}

#[test]
fn int64_max_truncates_to_minus_one() {
    assert_eq!(Value::Integer64(i64::MAX).int32_value(), -1);
}

#[test]
fn null_reads_as_zero_and_empty() {
    let value = Value::null();
    assert_eq!(value.int32_value(), 0);
    assert_eq!(value.double_value(), 0.0);
    assert_eq!(value.string_value(), "");
    assert!(value.blob_value().is_empty());
    assert_eq!(value.to_string(), "NULL");
}
