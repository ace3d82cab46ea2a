//! Teo FFI - C ABI for host language bindings
//!
//! This crate exposes the Teo value model and app bootstrap protocol to
//! C-compatible hosts such as Go, Java (via JNI/Panama) and C itself.
//!
//! # Conventions
//!
//! - Every fallible function returns a [`TeoResult`] and writes its output
//!   through an out-parameter. The message for the most recent failure on the
//!   calling thread is available from [`teo_get_last_error`].
//! - Values cross the boundary as [`TeoValue`] handles into a process-wide
//!   table, never as raw pointers.
//! - Strings returned to the host are tracked; [`teo_string_free`] on a pointer
//!   that is not live reports `InvalidHandle` instead of freeing it.
//!
//! # Safety
//!
//! Functions taking raw pointers are `unsafe`. Callers must ensure:
//! - Builder and app pointers come from this library and are freed once
//! - Input strings are valid, NUL-terminated UTF-8
//! - Out-parameters point to writable memory

#![warn(missing_docs)]

#[macro_use]
mod error;
mod app;
mod builder;
mod handles;
mod memory;
mod types;
mod value;

// Re-export public API
pub use app::*;
pub use builder::*;
pub use memory::{live_string_count, teo_clear_error, teo_get_last_error, teo_string_free};
pub use types::{
    TeoApp, TeoAppBuilder, TeoAppCallback, TeoPerformerFn, TeoResult, TeoTransformFn,
    TeoValidatorFn, TeoValue,
};
pub use value::*;
