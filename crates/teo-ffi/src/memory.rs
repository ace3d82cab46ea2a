//! Memory management utilities for FFI
//!
//! Strings handed to the host are tracked in a process-wide registry so that
//! `teo_string_free` can tell a live allocation from a stale or foreign
//! pointer. Releasing the same pointer twice is reported, never performed.

use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::types::TeoResult;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

static STRINGS: OnceLock<Mutex<HashSet<usize>>> = OnceLock::new();

fn strings() -> MutexGuard<'static, HashSet<usize>> {
    STRINGS
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Set the last error message for the current thread
pub fn set_last_error<S: Into<String>>(err: S) {
    let mut message = err.into();
    message.retain(|c| c != '\0');
    let error_string = CString::new(message).unwrap_or_default();

    LAST_ERROR.with(|e| *e.borrow_mut() = Some(error_string));
}

/// Clear the last error message
pub fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Allocate a new string for FFI return
///
/// Returns null (with the last error set) if `s` contains a NUL byte. The
/// caller must free the string using `teo_string_free`.
pub fn allocate_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => {
            let raw = c_str.into_raw();
            strings().insert(raw as usize);
            raw
        }
        Err(_) => {
            set_last_error("String contains null byte");
            ptr::null_mut()
        }
    }
}

/// Number of strings handed out and not yet freed
pub fn live_string_count() -> usize {
    strings().len()
}

/// Free a string allocated by Teo
///
/// Freeing NULL succeeds and does nothing. Freeing a pointer that is not a
/// live Teo allocation returns `InvalidHandle` and does nothing.
///
/// # Safety
/// If `s` is a live Teo allocation it must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn teo_string_free(s: *mut c_char) -> TeoResult {
    if s.is_null() {
        return TeoResult::Success;
    }

    if !strings().remove(&(s as usize)) {
        set_last_error("String was already freed or was not allocated by Teo");
        return TeoResult::InvalidHandle;
    }

    drop(CString::from_raw(s));
    TeoResult::Success
}

/// Convert a C string to a Rust string
///
/// # Safety
/// The pointer must be a valid null-terminated C string
pub unsafe fn c_str_to_string(s: *const c_char, name: &str) -> Result<String, TeoResult> {
    if s.is_null() {
        set_last_error(format!("{} is null", name));
        return Err(TeoResult::NullPointer);
    }

    match CStr::from_ptr(s).to_str() {
        Ok(str) => Ok(str.to_string()),
        Err(_) => {
            set_last_error(format!("Invalid UTF-8 in {}", name));
            Err(TeoResult::Utf8Error)
        }
    }
}

/// Get the last error message
///
/// # Safety
/// Returns a pointer that should NOT be freed by the caller. It stays valid
/// until the next Teo call on the same thread.
#[no_mangle]
pub unsafe extern "C" fn teo_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn teo_clear_error() {
    clear_last_error();
}
