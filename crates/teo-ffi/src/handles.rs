//! Process-wide table backing `TeoValue` handles

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use teo_core::Value;

use crate::error::map_core_error;
use crate::memory::set_last_error;
use crate::types::{TeoResult, TeoValue};

#[derive(Default)]
struct HandleTable {
    next_id: u64,
    values: HashMap<u64, Value>,
}

static HANDLES: OnceLock<Mutex<HandleTable>> = OnceLock::new();

fn table() -> MutexGuard<'static, HandleTable> {
    HANDLES
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn invalid(handle: TeoValue) -> TeoResult {
    set_last_error(format!("Value handle {} is not live", handle.id));
    TeoResult::InvalidHandle
}

/// Store `value` and issue a fresh handle for it
pub fn insert(value: Value) -> TeoValue {
    let mut table = table();
    table.next_id += 1;
    let id = table.next_id;
    table.values.insert(id, value);
    TeoValue { id }
}

/// Remove and return the value behind `handle`
pub fn take(handle: TeoValue) -> Result<Value, TeoResult> {
    table().values.remove(&handle.id).ok_or_else(|| invalid(handle))
}

/// Convert the value behind `handle`, consuming the handle only on success
pub fn take_as<T>(handle: TeoValue) -> Result<T, TeoResult>
where
    T: TryFrom<Value, Error = teo_core::Error>,
{
    let mut table = table();
    let value = table.values.get(&handle.id).ok_or_else(|| invalid(handle))?;
    let converted = T::try_from(value.clone()).map_err(map_core_error)?;
    table.values.remove(&handle.id);
    Ok(converted)
}

/// Inspect the value behind `handle` without consuming it
pub fn peek<R>(handle: TeoValue, f: impl FnOnce(&Value) -> R) -> Result<R, TeoResult> {
    let table = table();
    let value = table.values.get(&handle.id).ok_or_else(|| invalid(handle))?;
    Ok(f(value))
}

/// Drop the value behind `handle`; returns whether it was live
pub fn release(handle: TeoValue) -> bool {
    table().values.remove(&handle.id).is_some()
}

/// Number of live handles
pub fn count() -> usize {
    table().values.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_zero_or_reused() {
        let a = insert(Value::Null);
        let b = insert(Value::Null);
        assert_ne!(a, TeoValue::INVALID);
        assert_ne!(a, b);

        assert!(release(a));
        let c = insert(Value::Null);
        assert_ne!(a, c);
        release(b);
        release(c);
    }

    #[test]
    fn test_failed_conversion_keeps_handle() {
        let handle = insert(Value::from("x"));
        assert_eq!(take_as::<bool>(handle).unwrap_err(), TeoResult::TypeMismatch);
        assert_eq!(take_as::<String>(handle).unwrap(), "x");
        assert_eq!(take(handle).unwrap_err(), TeoResult::InvalidHandle);
    }

    #[test]
    fn test_release_is_idempotent() {
        let handle = insert(Value::from(1i32));
        assert!(release(handle));
        assert!(!release(handle));
        assert_eq!(peek(handle, Value::is_null).unwrap_err(), TeoResult::InvalidHandle);
    }
}
