//! Dynamic value model shared between hosts and the engine
//!
//! [`Value`] is the tagged union every hook receives and returns. Host
//! primitives convert into it with `From` (always succeeds, strings are
//! copied) and back out with `TryFrom` (fails with [`Error::TypeMismatch`]
//! when the tag is not compatible).
//!
//! Numeric conversions follow `as` semantics inside a family and nowhere
//! else:
//!
//! | family   | tags                         |
//! |----------|------------------------------|
//! | signed   | `I8`, `I16`, `I32`, `I64`    |
//! | unsigned | `U8`, `U16`, `U32`, `U64`    |
//! | float    | `F32`, `F64`                 |
//!
//! Signed and unsigned integers never convert into each other and strings
//! are never parsed.
//!
//! # Example
//!
//! ```
//! use teo_core::{Value, ValueKind};
//!
//! let value = Value::from(300i32);
//! assert_eq!(value.kind(), ValueKind::I32);
//!
//! let narrowed: i8 = value.clone().try_into().unwrap();
//! assert_eq!(narrowed, 44);
//!
//! let err = bool::try_from(Value::from("x")).unwrap_err();
//! assert!(err.to_string().contains("expected bool"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// A dynamically typed datum
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    Bool(bool),
    /// C `char`
    I8(i8),
    /// C `short`
    I16(i16),
    /// C `int`
    I32(i32),
    /// C `long` and `long long`
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
}

/// The dynamic tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl ValueKind {
    /// All tags, in declaration order
    pub const ALL: [ValueKind; 13] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::I8,
        ValueKind::I16,
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::U8,
        ValueKind::U16,
        ValueKind::U32,
        ValueKind::U64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::String,
    ];

    /// Whether a value of `self` may be converted into `target`
    pub fn converts_to(self, target: ValueKind) -> bool {
        self == target || (self.family().is_some() && self.family() == target.family())
    }

    fn family(self) -> Option<u8> {
        match self {
            ValueKind::I8 | ValueKind::I16 | ValueKind::I32 | ValueKind::I64 => Some(0),
            ValueKind::U8 | ValueKind::U16 | ValueKind::U32 | ValueKind::U64 => Some(1),
            ValueKind::F32 | ValueKind::F64 => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::String => "string",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The null value
    pub fn null() -> Self {
        Value::Null
    }

    /// Dynamic tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U8(_) => ValueKind::U8,
            Value::U16(_) => ValueKind::U16,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::String(_) => ValueKind::String,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract an owned string
    pub fn into_string(self) -> Result<String> {
        self.try_into()
    }

    /// Extract a boolean
    pub fn into_bool(self) -> Result<bool> {
        self.try_into()
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Convert a JSON scalar into a value
    ///
    /// Integers become `I64` when they fit and `U64` otherwise; other
    /// numbers become `F64`. Arrays and objects have no representation.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::U64(u))
                } else {
                    n.as_f64().map(Value::F64).ok_or_else(|| Error::Json {
                        message: format!("number {} is not representable", n),
                        source: None,
                    })
                }
            }
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::Json {
                message: "arrays and objects have no value representation".to_string(),
                source: None,
            }),
        }
    }

    /// Render this value as JSON; non-finite floats become `null`
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::I8(v) => JsonValue::from(*v),
            Value::I16(v) => JsonValue::from(*v),
            Value::I32(v) => JsonValue::from(*v),
            Value::I64(v) => JsonValue::from(*v),
            Value::U8(v) => JsonValue::from(*v),
            Value::U16(v) => JsonValue::from(*v),
            Value::U32(v) => JsonValue::from(*v),
            Value::U64(v) => JsonValue::from(*v),
            Value::F32(v) => serde_json::Number::from_f64(f64::from(*v))
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// Widening and narrowing within one numeric family
macro_rules! impl_try_from_family {
    ($target:ty, $kind:ident, [$($variant:ident),*]) => {
        impl TryFrom<Value> for $target {
            type Error = Error;

            #[allow(clippy::unnecessary_cast)]
            fn try_from(value: Value) -> Result<Self> {
                match value {
                    $(Value::$variant(v) => Ok(v as $target),)*
                    other => Err(other.mismatch(ValueKind::$kind)),
                }
            }
        }
    };
}

impl_try_from_family!(i8, I8, [I8, I16, I32, I64]);
impl_try_from_family!(i16, I16, [I8, I16, I32, I64]);
impl_try_from_family!(i32, I32, [I8, I16, I32, I64]);
impl_try_from_family!(i64, I64, [I8, I16, I32, I64]);
impl_try_from_family!(u8, U8, [U8, U16, U32, U64]);
impl_try_from_family!(u16, U16, [U8, U16, U32, U64]);
impl_try_from_family!(u32, U32, [U8, U16, U32, U64]);
impl_try_from_family!(u64, U64, [U8, U16, U32, U64]);
impl_try_from_family!(f32, F32, [F32, F64]);
impl_try_from_family!(f64, F64, [F32, F64]);

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }
}

impl TryFrom<Value> for () {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(other.mismatch(ValueKind::Null)),
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}
