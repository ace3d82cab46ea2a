//! Property-based tests for the value model
//!
//! These tests verify that every primitive survives a trip through `Value`
//! and that conversions between incompatible tags are always rejected.

use proptest::prelude::*;
use teo_core::{Error, Value, ValueKind};

/// One representative value per tag
fn sample(kind: ValueKind) -> Value {
    match kind {
        ValueKind::Null => Value::Null,
        ValueKind::Bool => Value::from(true),
        ValueKind::I8 => Value::from(-1i8),
        ValueKind::I16 => Value::from(-2i16),
        ValueKind::I32 => Value::from(-3i32),
        ValueKind::I64 => Value::from(-4i64),
        ValueKind::U8 => Value::from(1u8),
        ValueKind::U16 => Value::from(2u16),
        ValueKind::U32 => Value::from(3u32),
        ValueKind::U64 => Value::from(4u64),
        ValueKind::F32 => Value::from(0.5f32),
        ValueKind::F64 => Value::from(0.25f64),
        ValueKind::String => Value::from("x"),
    }
}

/// Extract `value` as the Rust type matching `target`
fn extract(value: Value, target: ValueKind) -> Result<(), Error> {
    match target {
        ValueKind::Null => <()>::try_from(value),
        ValueKind::Bool => bool::try_from(value).map(drop),
        ValueKind::I8 => i8::try_from(value).map(drop),
        ValueKind::I16 => i16::try_from(value).map(drop),
        ValueKind::I32 => i32::try_from(value).map(drop),
        ValueKind::I64 => i64::try_from(value).map(drop),
        ValueKind::U8 => u8::try_from(value).map(drop),
        ValueKind::U16 => u16::try_from(value).map(drop),
        ValueKind::U32 => u32::try_from(value).map(drop),
        ValueKind::U64 => u64::try_from(value).map(drop),
        ValueKind::F32 => f32::try_from(value).map(drop),
        ValueKind::F64 => f64::try_from(value).map(drop),
        ValueKind::String => String::try_from(value).map(drop),
    }
}

#[test]
fn every_incompatible_pair_is_a_type_mismatch() {
    for source in ValueKind::ALL {
        for target in ValueKind::ALL {
            let result = extract(sample(source), target);
            if source.converts_to(target) {
                assert!(result.is_ok(), "{source} -> {target} should convert");
            } else {
                match result {
                    Err(Error::TypeMismatch { expected, found }) => {
                        assert_eq!(expected, target);
                        assert_eq!(found, source);
                    }
                    other => panic!("{source} -> {target}: expected TypeMismatch, got {other:?}"),
                }
            }
        }
    }
}

#[test]
fn boundary_values_round_trip() {
    assert_eq!(i8::try_from(Value::from(i8::MIN)).unwrap(), i8::MIN);
    assert_eq!(i8::try_from(Value::from(i8::MAX)).unwrap(), i8::MAX);
    assert_eq!(i64::try_from(Value::from(i64::MIN)).unwrap(), i64::MIN);
    assert_eq!(u64::try_from(Value::from(u64::MAX)).unwrap(), u64::MAX);
    assert_eq!(u8::try_from(Value::from(0u8)).unwrap(), 0);
    assert_eq!(f64::try_from(Value::from(f64::MAX)).unwrap(), f64::MAX);
    assert_eq!(String::try_from(Value::from("")).unwrap(), "");
    assert!(Value::null().is_null());
    assert!(<()>::try_from(Value::null()).is_ok());
}

proptest! {
    #[test]
    fn prop_signed_round_trip(a in any::<i8>(), b in any::<i16>(), c in any::<i32>(), d in any::<i64>()) {
        prop_assert_eq!(i8::try_from(Value::from(a)).unwrap(), a);
        prop_assert_eq!(i16::try_from(Value::from(b)).unwrap(), b);
        prop_assert_eq!(i32::try_from(Value::from(c)).unwrap(), c);
        prop_assert_eq!(i64::try_from(Value::from(d)).unwrap(), d);
    }

    #[test]
    fn prop_unsigned_round_trip(a in any::<u8>(), b in any::<u16>(), c in any::<u32>(), d in any::<u64>()) {
        prop_assert_eq!(u8::try_from(Value::from(a)).unwrap(), a);
        prop_assert_eq!(u16::try_from(Value::from(b)).unwrap(), b);
        prop_assert_eq!(u32::try_from(Value::from(c)).unwrap(), c);
        prop_assert_eq!(u64::try_from(Value::from(d)).unwrap(), d);
    }

    #[test]
    fn prop_bool_and_string_round_trip(b in any::<bool>(), s in ".*") {
        prop_assert_eq!(Value::from(b).into_bool().unwrap(), b);
        prop_assert_eq!(Value::from(s.as_str()).into_string().unwrap(), s);
    }

    #[test]
    fn prop_float_round_trip(f in any::<f64>().prop_filter("NaN never equals itself", |f| !f.is_nan())) {
        prop_assert_eq!(f64::try_from(Value::from(f)).unwrap(), f);
    }

    #[test]
    fn prop_widening_preserves_value(v in any::<i16>()) {
        prop_assert_eq!(i64::try_from(Value::from(v)).unwrap(), i64::from(v));
    }

    #[test]
    fn prop_narrowing_matches_as_cast(v in any::<i64>()) {
        prop_assert_eq!(i8::try_from(Value::from(v)).unwrap(), v as i8);
        prop_assert_eq!(i32::try_from(Value::from(v)).unwrap(), v as i32);
    }
}
