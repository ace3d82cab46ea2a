//! App lifecycle and stub engine entry points
//!
//! `teo_app_run` blocks the calling thread on a process-wide tokio runtime
//! until `teo_app_shutdown` is called from any other thread. While the loop
//! runs, `teo_app_transform`, `teo_app_validate` and `teo_app_perform` queue
//! invocations onto it and wait for the reply. They must not be called from
//! inside a hook callback.

use std::os::raw::c_char;
use std::sync::OnceLock;

use teo_core::{App, Validity};
use tokio::runtime::{Builder, Runtime};

use crate::error::{map_core_error, validate_mut_ptr, validate_ptr};
use crate::ffi_boundary;
use crate::handles;
use crate::memory::{allocate_string, c_str_to_string, clear_last_error, set_last_error};
use crate::types::{TeoApp, TeoResult, TeoValue};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> Result<&'static Runtime, TeoResult> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("teo-ffi")
        .build()
        .map_err(|e| {
            set_last_error(format!("Failed to start runtime: {}", e));
            TeoResult::InternalError
        })?;
    // A concurrent first call may have won the race; its runtime is used
    let _ = RUNTIME.set(runtime);
    RUNTIME.get().ok_or(TeoResult::InternalError)
}

unsafe fn app_ref<'a>(app: *const TeoApp) -> Result<&'a App, TeoResult> {
    validate_ptr(app, "app")?;
    Ok(&*(app as *const App))
}

fn ensure_running(app: &App) -> Result<(), TeoResult> {
    if app.is_running() {
        Ok(())
    } else if app.shutdown_handle().is_shutdown() {
        set_last_error("App has stopped");
        Err(TeoResult::AppStopped)
    } else {
        set_last_error("App loop has not been entered; call teo_app_run first");
        Err(TeoResult::NotRunning)
    }
}

/// Run the app until `teo_app_shutdown` is called
///
/// # Safety
/// `app` must come from `teo_app_builder_build` or `teo_app_builder_build_with`
/// and must not be freed while this call is blocked.
#[no_mangle]
pub unsafe extern "C" fn teo_app_run(app: *const TeoApp) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let app = app_ref(app)?;
        runtime()?.block_on(app.run()).map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Ask a running app to stop; safe to call from any thread, more than once
///
/// # Safety
/// `app` must be a live app pointer.
#[no_mangle]
pub unsafe extern "C" fn teo_app_shutdown(app: *const TeoApp) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        app_ref(app)?.shutdown_handle().shutdown();
        Ok(TeoResult::Success)
    })
}

/// Report whether the app's loop is currently running
///
/// # Safety
/// `app` must be a live app pointer and `out` writable.
#[no_mangle]
pub unsafe extern "C" fn teo_app_is_running(app: *const TeoApp, out: *mut bool) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out, "out")?;
        *out = app_ref(app)?.is_running();
        Ok(TeoResult::Success)
    })
}

/// Invoke a transform on the running app
///
/// `input` is consumed once the invocation is dispatched. On success
/// `*out` is a new handle owned by the caller.
///
/// # Safety
/// `app` must be a live app pointer, `name` a valid C string and `out`
/// writable.
#[no_mangle]
pub unsafe extern "C" fn teo_app_transform(
    app: *const TeoApp,
    name: *const c_char,
    input: TeoValue,
    out: *mut TeoValue,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out, "out")?;
        let app = app_ref(app)?;
        let name = c_str_to_string(name, "name")?;
        ensure_running(app)?;
        let value = handles::take(input)?;

        let output = runtime()?
            .block_on(app.handle().transform(&name, value))
            .map_err(map_core_error)?;
        *out = handles::insert(output);
        Ok(TeoResult::Success)
    })
}

/// Invoke a validator on the running app
///
/// `input` is consumed once the invocation is dispatched. `*out_valid`
/// receives the verdict. When `out_reason` is not null it receives NULL for a
/// valid input or a string to free with `teo_string_free`.
///
/// # Safety
/// `app` must be a live app pointer, `name` a valid C string, `out_valid`
/// writable and `out_reason` null or writable.
#[no_mangle]
pub unsafe extern "C" fn teo_app_validate(
    app: *const TeoApp,
    name: *const c_char,
    input: TeoValue,
    out_valid: *mut bool,
    out_reason: *mut *mut c_char,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_valid, "out_valid")?;
        let app = app_ref(app)?;
        let name = c_str_to_string(name, "name")?;
        ensure_running(app)?;
        let value = handles::take(input)?;

        let validity = runtime()?
            .block_on(app.handle().validate(&name, value))
            .map_err(map_core_error)?;
        *out_valid = validity.is_valid();
        if !out_reason.is_null() {
            *out_reason = reason_string(&validity)?;
        }
        Ok(TeoResult::Success)
    })
}

/// Allocate the reason of an invalid verdict, NULL for a valid one
fn reason_string(validity: &Validity) -> Result<*mut c_char, TeoResult> {
    match validity.reason() {
        Some(reason) => {
            let raw = allocate_string(reason);
            if raw.is_null() {
                return Err(TeoResult::MemoryError);
            }
            Ok(raw)
        }
        None => Ok(std::ptr::null_mut()),
    }
}

/// Invoke a performer on the running app
///
/// # Safety
/// `app` must be a live app pointer and `name` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn teo_app_perform(
    app: *const TeoApp,
    name: *const c_char,
    input: TeoValue,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let app = app_ref(app)?;
        let name = c_str_to_string(name, "name")?;
        ensure_running(app)?;
        let value = handles::take(input)?;

        runtime()?
            .block_on(app.handle().perform(&name, value))
            .map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Free an app
///
/// # Safety
/// The app pointer must come from a build function and its loop must have
/// returned.
#[no_mangle]
pub unsafe extern "C" fn teo_app_free(app: *mut TeoApp) {
    if app.is_null() {
        return;
    }

    drop(Box::from_raw(app as *mut App));
}

/// Get version information
///
/// # Safety
/// The returned string should NOT be freed
#[no_mangle]
pub unsafe extern "C" fn teo_version() -> *const c_char {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
