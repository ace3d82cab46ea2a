//! App builder functions
//!
//! Hooks registered here are C function pointers wrapped in closures that
//! move values across the handle table: the input is inserted before the
//! callback runs and released after it returns, and the handle the callback
//! returns is taken back out.

use std::os::raw::c_char;

use teo_core::{AppBuilder, Error, RegistrationPolicy, Validity, Value};

use crate::error::{map_core_error, require_callback, validate_mut_ptr};
use crate::ffi_boundary;
use crate::handles;
use crate::memory::{c_str_to_string, clear_last_error};
use crate::types::{
    TeoApp, TeoAppBuilder, TeoAppCallback, TeoPerformerFn, TeoResult, TeoTransformFn,
    TeoValidatorFn, TeoValue,
};

/// Create a new app builder for a host language and version
///
/// # Safety
/// `lang` and `version` must be valid C strings and `out_builder` writable.
/// The builder must be freed with `teo_app_builder_free`.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_new(
    lang: *const c_char,
    version: *const c_char,
    out_builder: *mut *mut TeoAppBuilder,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_builder, "out_builder")?;
        let lang = c_str_to_string(lang, "lang")?;
        let version = c_str_to_string(version, "version")?;

        let builder = Box::new(AppBuilder::new(&lang, &version));
        *out_builder = Box::into_raw(builder) as *mut TeoAppBuilder;
        Ok(TeoResult::Success)
    })
}

/// Register a transform
///
/// # Safety
/// `builder` must come from `teo_app_builder_new` and `name` must be a valid
/// C string.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_transform(
    builder: *mut TeoAppBuilder,
    name: *const c_char,
    callback: Option<TeoTransformFn>,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let name = c_str_to_string(name, "name")?;
        let callback = require_callback(callback, "callback")?;

        builder
            .register_transform(name, move |value| call_transform(callback, value))
            .map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Register a validator
///
/// The callback answers with a value handle: null means valid, a bool is
/// read as valid/invalid and a string is the reason the input is invalid.
///
/// # Safety
/// `builder` must come from `teo_app_builder_new` and `name` must be a valid
/// C string.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_validate(
    builder: *mut TeoAppBuilder,
    name: *const c_char,
    callback: Option<TeoValidatorFn>,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let name = c_str_to_string(name, "name")?;
        let callback = require_callback(callback, "callback")?;

        builder
            .register_validator(name, move |value| call_validator(callback, value))
            .map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Register a performer
///
/// # Safety
/// `builder` must come from `teo_app_builder_new` and `name` must be a valid
/// C string.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_perform(
    builder: *mut TeoAppBuilder,
    name: *const c_char,
    callback: Option<TeoPerformerFn>,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let name = c_str_to_string(name, "name")?;
        let callback = require_callback(callback, "callback")?;

        builder
            .register_performer(name, move |value| {
                let input = handles::insert(value);
                callback(input);
                handles::release(input);
                Ok(())
            })
            .map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Make registering an existing hook name an error instead of a replacement
///
/// # Safety
/// `builder` must come from `teo_app_builder_new`.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_set_reject_duplicates(
    builder: *mut TeoAppBuilder,
    reject: bool,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let policy = if reject {
            RegistrationPolicy::Reject
        } else {
            RegistrationPolicy::Overwrite
        };
        builder.registration_policy(policy).map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Record the schema reference
///
/// A null `schema_file_name` selects the default `schema.teo`.
///
/// # Safety
/// `builder` must come from `teo_app_builder_new`; `schema_file_name` must be
/// null or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_load(
    builder: *mut TeoAppBuilder,
    schema_file_name: *const c_char,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let source_ref = if schema_file_name.is_null() {
            teo_core::schema::DEFAULT_SCHEMA_FILE.to_string()
        } else {
            c_str_to_string(schema_file_name, "schema_file_name")?
        };
        builder.load_schema(source_ref).map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Build the app
///
/// On success the builder is consumed (but must still be freed) and
/// `*out_app` owns the new app, to be freed with `teo_app_free`.
///
/// # Safety
/// `builder` must come from `teo_app_builder_new` and `out_app` be writable.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_build(
    builder: *mut TeoAppBuilder,
    out_app: *mut *mut TeoApp,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        validate_mut_ptr(out_app, "out_app")?;
        let builder = builder_mut(builder)?;
        let app = builder.build().map_err(map_core_error)?;
        *out_app = Box::into_raw(Box::new(app)) as *mut TeoApp;
        Ok(TeoResult::Success)
    })
}

/// Build the app and pass it to `callback`
///
/// The callback receives ownership of the app and must eventually free it
/// with `teo_app_free`. A host typically calls `teo_app_run` from here.
///
/// # Safety
/// `builder` must come from `teo_app_builder_new`.
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_build_with(
    builder: *mut TeoAppBuilder,
    callback: Option<TeoAppCallback>,
) -> TeoResult {
    ffi_boundary!({
        clear_last_error();
        let builder = builder_mut(builder)?;
        let callback = require_callback(callback, "callback")?;
        builder
            .build_with(|app| callback(Box::into_raw(Box::new(app)) as *mut TeoApp))
            .map_err(map_core_error)?;
        Ok(TeoResult::Success)
    })
}

/// Free an app builder
///
/// # Safety
/// The builder pointer must have been created by `teo_app_builder_new`
#[no_mangle]
pub unsafe extern "C" fn teo_app_builder_free(builder: *mut TeoAppBuilder) {
    if builder.is_null() {
        return;
    }

    drop(Box::from_raw(builder as *mut AppBuilder));
}

unsafe fn builder_mut<'a>(builder: *mut TeoAppBuilder) -> Result<&'a mut AppBuilder, TeoResult> {
    validate_mut_ptr(builder, "builder")?;
    Ok(&mut *(builder as *mut AppBuilder))
}

fn returned_handle(kind: &str, output: TeoValue) -> Error {
    Error::InvalidHandle {
        message: format!("{} callback returned handle {} which is not live", kind, output.id),
    }
}

fn call_transform(callback: TeoTransformFn, value: Value) -> teo_core::Result<Value> {
    let input = handles::insert(value);
    let output = callback(input);
    // Take the output first: a callback may hand back its own input
    let result = handles::take(output).map_err(|_| returned_handle("transform", output));
    handles::release(input);
    result
}

fn call_validator(callback: TeoValidatorFn, value: Value) -> teo_core::Result<Validity> {
    let input = handles::insert(value);
    let output = callback(input);
    let result = handles::take(output).map_err(|_| returned_handle("validator", output));
    handles::release(input);
    Validity::try_from(result?)
}
