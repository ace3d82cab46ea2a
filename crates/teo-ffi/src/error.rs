//! Error handling for FFI boundary
//!
//! This module provides utilities for safely propagating errors
//! across the FFI boundary without panics or undefined behavior.

use std::any::Any;
use std::panic;

use crate::memory::set_last_error;
use crate::types::TeoResult;

/// Convert a Teo core error to an FFI result code
pub fn map_core_error(error: teo_core::Error) -> TeoResult {
    use teo_core::Error;

    let code = match &error {
        Error::TypeMismatch { .. } => TeoResult::TypeMismatch,
        Error::InvalidHandle { .. } => TeoResult::InvalidHandle,
        Error::Schema { .. } => TeoResult::SchemaError,
        Error::BuilderAlreadyConsumed => TeoResult::BuilderAlreadyConsumed,
        Error::DuplicateRegistration { .. } => TeoResult::DuplicateRegistration,
        Error::HookNotFound { .. } => TeoResult::HookNotFound,
        Error::Hook { .. } => TeoResult::HookFailed,
        Error::AlreadyRunning => TeoResult::AlreadyRunning,
        Error::AppStopped => TeoResult::AppStopped,
        Error::Json { .. } => TeoResult::InvalidInput,
        Error::Io { .. } | Error::Internal { .. } => TeoResult::InternalError,
    };

    tracing::debug!(?code, %error, "Core error crossed the FFI boundary");
    set_last_error(error.to_string());
    code
}

/// Safely execute a closure that might panic
///
/// This function catches any panics and converts them to appropriate
/// error codes, preventing undefined behavior at the FFI boundary.
pub fn catch_panic<F, R>(f: F) -> Result<R, TeoResult>
where
    F: FnOnce() -> Result<R, TeoResult>,
{
    match panic::catch_unwind(panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            tracing::error!(panic = %msg, "Panic caught at FFI boundary");
            set_last_error(format!(
                "{}: panic occurred: {}",
                TeoResult::InternalError.error_message(),
                msg
            ));
            Err(TeoResult::InternalError)
        }
    }
}

fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for safely executing FFI functions
#[macro_export]
macro_rules! ffi_boundary {
    ($body:expr) => {{
        match $crate::error::catch_panic(|| $body) {
            Ok(result) => result,
            Err(code) => return code,
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &str) -> Result<(), TeoResult> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        Err(TeoResult::NullPointer)
    } else {
        Ok(())
    }
}

/// Validate that a mutable pointer is not null
pub fn validate_mut_ptr<T>(ptr: *mut T, name: &str) -> Result<(), TeoResult> {
    validate_ptr(ptr as *const T, name)
}

/// Unwrap a nullable callback argument
pub fn require_callback<F>(callback: Option<F>, name: &str) -> Result<F, TeoResult> {
    callback.ok_or_else(|| {
        set_last_error(format!("{} is null", name));
        TeoResult::NullPointer
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use teo_core::{Error, HookKind, ValueKind};

    #[test]
    fn test_panic_catching() {
        let result = catch_panic(|| {
            panic!("Test panic");
            #[allow(unreachable_code)]
            Ok(42)
        });

        assert_eq!(result.unwrap_err(), TeoResult::InternalError);
        let message = unsafe { std::ffi::CStr::from_ptr(crate::memory::teo_get_last_error()) };
        assert_eq!(message.to_str().unwrap(), "Internal error: panic occurred: Test panic");
    }

    #[test]
    fn test_ptr_validation() {
        let value = 42;
        let ptr = &value as *const i32;

        assert!(validate_ptr(ptr, "test_ptr").is_ok());
        assert_eq!(
            validate_ptr(std::ptr::null::<i32>(), "null_ptr").unwrap_err(),
            TeoResult::NullPointer
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let cases = [
            (
                Error::TypeMismatch {
                    expected: ValueKind::Bool,
                    found: ValueKind::String,
                },
                TeoResult::TypeMismatch,
            ),
            (Error::BuilderAlreadyConsumed, TeoResult::BuilderAlreadyConsumed),
            (Error::schema("missing schema", None), TeoResult::SchemaError),
            (
                Error::hook(HookKind::Performer, "log", "boom"),
                TeoResult::HookFailed,
            ),
            (Error::AppStopped, TeoResult::AppStopped),
        ];

        for (error, expected) in cases {
            assert_eq!(map_core_error(error), expected);
        }
    }
}
