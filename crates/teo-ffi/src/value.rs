//! Value marshaling functions
//!
//! `teo_value_from_*` wraps a host primitive in a new handle. The matching
//! `teo_value_into_*` writes the primitive to an out-parameter and consumes
//! the handle on success; on `TypeMismatch` the handle stays live so the host
//! can try another type or free it.
//!
//! C `char` maps to the signed 8-bit tag and both `long` and `long long` map
//! to the 64-bit tags, whatever the platform's width for `long`.

use std::os::raw::{
    c_char, c_double, c_float, c_int, c_long, c_longlong, c_short, c_uchar, c_uint, c_ulong,
    c_ulonglong, c_ushort,
};

use teo_core::Value;

use crate::error::validate_mut_ptr;
use crate::ffi_boundary;
use crate::handles;
use crate::memory::{allocate_string, c_str_to_string, clear_last_error, set_last_error};
use crate::types::{TeoResult, TeoValue};

macro_rules! value_from {
    ($(#[$doc:meta] $name:ident($ty:ty) => $variant:ident as $target:ty;)*) => {
        $(
            #[$doc]
            #[no_mangle]
            #[allow(clippy::unnecessary_cast)]
            pub extern "C" fn $name(value: $ty) -> TeoValue {
                handles::insert(Value::$variant(value as $target))
            }
        )*
    };
}

macro_rules! value_into {
    ($(#[$doc:meta] $name:ident -> $ty:ident via $rust:ty;)*) => {
        $(
            #[$doc]
            ///
            /// # Safety
            /// `out` must point to writable memory for one value.
            #[no_mangle]
            #[allow(clippy::unnecessary_cast)]
            pub unsafe extern "C" fn $name(value: TeoValue, out: *mut $ty) -> TeoResult {
                ffi_boundary!({
                    clear_last_error();
                    validate_mut_ptr(out, "out")?;
                    let converted: $rust = handles::take_as(value)?;
                    *out = converted as $ty;
                    Ok(TeoResult::Success)
                })
            }
        )*
    };
}

/// Create a null value
#[no_mangle]
pub extern "C" fn teo_value_from_null() -> TeoValue {
    handles::insert(Value::Null)
}

/// Create a boolean value
#[no_mangle]
pub extern "C" fn teo_value_from_bool(value: bool) -> TeoValue {
    handles::insert(Value::Bool(value))
}

value_from! {
    /// Create a signed 8-bit value from a C `char`
    teo_value_from_char(c_char) => I8 as i8;
    /// Create a signed 16-bit value
    teo_value_from_short(c_short) => I16 as i16;
    /// Create a signed 32-bit value
    teo_value_from_int(c_int) => I32 as i32;
    /// Create a signed 64-bit value from a C `long`
    teo_value_from_long(c_long) => I64 as i64;
    /// Create a signed 64-bit value
    teo_value_from_longlong(c_longlong) => I64 as i64;
    /// Create an unsigned 8-bit value
    teo_value_from_uchar(c_uchar) => U8 as u8;
    /// Create an unsigned 16-bit value
    teo_value_from_ushort(c_ushort) => U16 as u16;
    /// Create an unsigned 32-bit value
    teo_value_from_uint(c_uint) => U32 as u32;
    /// Create an unsigned 64-bit value from a C `unsigned long`
    teo_value_from_ulong(c_ulong) => U64 as u64;
    /// Create an unsigned 64-bit value
    teo_value_from_ulonglong(c_ulonglong) => U64 as u64;
    /// Create a 32-bit float value
    teo_value_from_float(c_float) => F32 as f32;
    /// Create a 64-bit float value
    teo_value_from_double(c_double) => F64 as f64;
}

/// Create a string value by copying a NUL-terminated UTF-8 string
///
/// # Safety
/// `value` must be a valid C string and `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn teo_value_from_string(
    value: *const c_char,
    out: *mut TeoValue,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out, "out")?;
        let string = c_str_to_string(value, "value")?;
        *out = handles::insert(Value::String(string));
        Ok(TeoResult::Success)
    })
}

/// Consume a null value
#[no_mangle]
pub extern "C" fn teo_value_into_null(value: TeoValue) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        handles::take_as::<()>(value)?;
        Ok(TeoResult::Success)
    })
}

value_into! {
    /// Extract a boolean
    teo_value_into_bool -> bool via bool;
    /// Extract a signed 8-bit integer as a C `char`
    teo_value_into_char -> c_char via i8;
    /// Extract a signed 16-bit integer
    teo_value_into_short -> c_short via i16;
    /// Extract a signed 32-bit integer
    teo_value_into_int -> c_int via i32;
    /// Extract a signed 64-bit integer as a C `long`
    teo_value_into_long -> c_long via i64;
    /// Extract a signed 64-bit integer
    teo_value_into_longlong -> c_longlong via i64;
    /// Extract an unsigned 8-bit integer
    teo_value_into_uchar -> c_uchar via u8;
    /// Extract an unsigned 16-bit integer
    teo_value_into_ushort -> c_ushort via u16;
    /// Extract an unsigned 32-bit integer
    teo_value_into_uint -> c_uint via u32;
    /// Extract an unsigned 64-bit integer as a C `unsigned long`
    teo_value_into_ulong -> c_ulong via u64;
    /// Extract an unsigned 64-bit integer
    teo_value_into_ulonglong -> c_ulonglong via u64;
    /// Extract a 32-bit float
    teo_value_into_float -> c_float via f32;
    /// Extract a 64-bit float
    teo_value_into_double -> c_double via f64;
}

/// Extract a string
///
/// On success `*out` is a new allocation owned by the caller, released with
/// `teo_string_free`. A string containing a NUL byte cannot be represented
/// and is rejected with `InvalidInput`, leaving the handle live.
///
/// # Safety
/// `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn teo_value_into_string(value: TeoValue, out: *mut *mut c_char) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out, "out")?;
        if handles::peek(value, |v| v.as_str().is_some_and(|s| s.contains('\0')))? {
            set_last_error("String value contains a NUL byte");
            return Err(TeoResult::InvalidInput);
        }
        let string: String = handles::take_as(value)?;
        let raw = allocate_string(&string);
        if raw.is_null() {
            return Err(TeoResult::MemoryError);
        }
        *out = raw;
        Ok(TeoResult::Success)
    })
}

/// Report whether a value is null without consuming it
///
/// # Safety
/// `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn teo_value_is_null(value: TeoValue, out: *mut bool) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out, "out")?;
        *out = handles::peek(value, Value::is_null)?;
        Ok(TeoResult::Success)
    })
}

/// Release a value without extracting it
#[no_mangle]
pub extern "C" fn teo_value_free(value: TeoValue) -> TeoResult {
    if handles::release(value) {
        TeoResult::Success
    } else {
        set_last_error(format!("Value handle {} is not live", value.id));
        TeoResult::InvalidHandle
    }
}

/// Number of live value handles
#[no_mangle]
pub extern "C" fn teo_value_handle_count() -> usize {
    handles::count()
}
