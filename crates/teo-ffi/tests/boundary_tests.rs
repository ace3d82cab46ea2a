//! FFI boundary tests
//!
//! These tests drive the C ABI the way a host does, including null pointer
//! handling, handle and string ownership, and a full build/run/shutdown
//! cycle with an invocation through the stub engine.

use serial_test::serial;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::thread;
use std::time::Duration;

use teo_ffi::*;

const EMAIL: &str = "abcqqoqxx@gmaaa.com";

/// Helper to convert Rust string to C string
fn to_c_string(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Helper to convert C string pointer to Rust string
unsafe fn from_c_string(s: *const c_char) -> String {
    if s.is_null() {
        String::new()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

extern "C" fn my_transform(input: TeoValue) -> TeoValue {
    let email = to_c_string(EMAIL);
    let mut out = TeoValue { id: 0 };
    unsafe {
        teo_value_from_string(email.as_ptr(), &mut out);
    }
    teo_value_free(input);
    out
}

extern "C" fn non_empty(input: TeoValue) -> TeoValue {
    let mut text: *mut c_char = ptr::null_mut();
    let verdict = unsafe {
        if teo_value_into_string(input, &mut text) != TeoResult::Success {
            return teo_value_from_bool(false);
        }
        let empty = from_c_string(text).is_empty();
        teo_string_free(text);
        empty
    };
    if verdict {
        let reason = to_c_string("must not be empty");
        let mut out = TeoValue { id: 0 };
        unsafe {
            teo_value_from_string(reason.as_ptr(), &mut out);
        }
        out
    } else {
        teo_value_from_null()
    }
}

extern "C" fn returns_int(_input: TeoValue) -> TeoValue {
    teo_value_from_int(1)
}

unsafe fn new_builder(lang: &str, version: &str) -> *mut TeoAppBuilder {
    let lang = to_c_string(lang);
    let version = to_c_string(version);
    let mut builder = ptr::null_mut();
    assert_eq!(
        teo_app_builder_new(lang.as_ptr(), version.as_ptr(), &mut builder),
        TeoResult::Success
    );
    builder
}

/// Raw app pointer that may be moved to the thread running its loop
struct SendApp(*mut TeoApp);
unsafe impl Send for SendApp {}

/// Start `teo_app_run` on its own thread and wait until the loop is live
unsafe fn spawn_run(app: *mut TeoApp) -> thread::JoinHandle<TeoResult> {
    let remote = SendApp(app);
    let runner = thread::spawn(move || {
        let remote = remote;
        unsafe { teo_app_run(remote.0) }
    });

    let mut running = false;
    for _ in 0..500 {
        assert_eq!(teo_app_is_running(app, &mut running), TeoResult::Success);
        if running {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert!(running, "app loop did not start");
    runner
}

#[test]
#[serial]
fn test_null_pointer_handling() {
    unsafe {
        let mut builder = ptr::null_mut();
        let result = teo_app_builder_new(ptr::null(), ptr::null(), &mut builder);
        assert_eq!(result, TeoResult::NullPointer);

        let error = teo_get_last_error();
        assert!(!error.is_null());
        assert!(from_c_string(error).contains("lang"));

        teo_clear_error();
        assert!(teo_get_last_error().is_null());

        let name = to_c_string("my");
        assert_eq!(
            teo_app_builder_transform(ptr::null_mut(), name.as_ptr(), Some(my_transform)),
            TeoResult::NullPointer
        );
        assert_eq!(teo_app_run(ptr::null()), TeoResult::NullPointer);
        assert_eq!(teo_value_from_string(ptr::null(), &mut TeoValue { id: 0 }), TeoResult::NullPointer);

        // Freeing null is a no-op
        teo_app_builder_free(ptr::null_mut());
        teo_app_free(ptr::null_mut());
        assert_eq!(teo_string_free(ptr::null_mut()), TeoResult::Success);
    }
}

#[test]
#[serial]
fn test_invalid_utf8_handling() {
    unsafe {
        let invalid_utf8 = [0xFFu8, 0xFE, 0x00];
        let mut out = TeoValue { id: 0 };
        let result = teo_value_from_string(invalid_utf8.as_ptr() as *const c_char, &mut out);
        assert_eq!(result, TeoResult::Utf8Error);
    }
}

#[test]
#[serial]
fn test_string_double_free_is_reported() {
    unsafe {
        let input = to_c_string("hello");
        let mut handle = TeoValue { id: 0 };
        assert_eq!(teo_value_from_string(input.as_ptr(), &mut handle), TeoResult::Success);

        let before = live_string_count();
        let mut out: *mut c_char = ptr::null_mut();
        assert_eq!(teo_value_into_string(handle, &mut out), TeoResult::Success);
        assert_eq!(live_string_count(), before + 1);
        assert_eq!(from_c_string(out), "hello");

        assert_eq!(teo_string_free(out), TeoResult::Success);
        assert_eq!(teo_string_free(out), TeoResult::InvalidHandle);
        assert_eq!(live_string_count(), before);
    }
}

#[test]
#[serial]
fn test_handles_are_consumed_exactly_once() {
    let before = teo_value_handle_count();
    let handle = teo_value_from_ulonglong(u64::MAX);
    assert_eq!(teo_value_handle_count(), before + 1);

    let mut wrong = false;
    let mut out = 0u64;
    unsafe {
        assert_eq!(teo_value_into_bool(handle, &mut wrong), TeoResult::TypeMismatch);
        assert_eq!(teo_value_handle_count(), before + 1);

        assert_eq!(teo_value_into_ulonglong(handle, &mut out), TeoResult::Success);
        assert_eq!(out, u64::MAX);
        assert_eq!(teo_value_handle_count(), before);

        assert_eq!(teo_value_into_ulonglong(handle, &mut out), TeoResult::InvalidHandle);
    }
}

#[test]
#[serial]
fn test_consumed_handle_cannot_be_inspected() {
    let handle = teo_value_from_bool(true);
    let mut b = false;
    let mut is_null = true;
    unsafe {
        assert_eq!(teo_value_into_bool(handle, &mut b), TeoResult::Success);
        assert!(b);

        assert_eq!(teo_value_is_null(handle, &mut is_null), TeoResult::InvalidHandle);
        assert!(is_null, "out must be left untouched");
        assert!(!teo_get_last_error().is_null());
        assert_eq!(teo_value_free(handle), TeoResult::InvalidHandle);
    }
}

#[test]
#[serial]
fn test_every_primitive_round_trips() {
    unsafe {
        let mut c: c_char = 0;
        let minus_five = -5i8 as c_char;
        assert_eq!(teo_value_into_char(teo_value_from_char(minus_five), &mut c), TeoResult::Success);
        assert_eq!(c, minus_five);

        let mut s = 0i16;
        assert_eq!(teo_value_into_short(teo_value_from_short(i16::MIN), &mut s), TeoResult::Success);
        assert_eq!(s, i16::MIN);

        let mut ll = 0i64;
        assert_eq!(
            teo_value_into_longlong(teo_value_from_longlong(i64::MIN), &mut ll),
            TeoResult::Success
        );
        assert_eq!(ll, i64::MIN);

        let mut uc = 0u8;
        assert_eq!(teo_value_into_uchar(teo_value_from_uchar(255), &mut uc), TeoResult::Success);
        assert_eq!(uc, 255);

        let mut ui = 0u32;
        assert_eq!(teo_value_into_uint(teo_value_from_uint(u32::MAX), &mut ui), TeoResult::Success);
        assert_eq!(ui, u32::MAX);

        let mut f = 0f32;
        assert_eq!(teo_value_into_float(teo_value_from_float(1.25), &mut f), TeoResult::Success);
        assert_eq!(f, 1.25);

        let mut d = 0f64;
        assert_eq!(teo_value_into_double(teo_value_from_double(-0.5), &mut d), TeoResult::Success);
        assert_eq!(d, -0.5);

        let mut b = false;
        assert_eq!(teo_value_into_bool(teo_value_from_bool(true), &mut b), TeoResult::Success);
        assert!(b);

        assert_eq!(teo_value_into_null(teo_value_from_null()), TeoResult::Success);
    }
}

#[test]
#[serial]
fn test_end_to_end_email_transform() {
    unsafe {
        let builder = new_builder("C", "14.0.0");
        let my = to_c_string("my");
        let schema = to_c_string("schema.teo");
        assert_eq!(
            teo_app_builder_transform(builder, my.as_ptr(), Some(my_transform)),
            TeoResult::Success
        );
        assert_eq!(teo_app_builder_load(builder, schema.as_ptr()), TeoResult::Success);

        let mut app = ptr::null_mut();
        assert_eq!(teo_app_builder_build(builder, &mut app), TeoResult::Success);
        teo_app_builder_free(builder);

        let before = teo_value_handle_count();
        let runner = spawn_run(app);

        let mut out = TeoValue { id: 0 };
        let input = teo_value_from_int(42);
        assert_eq!(teo_app_transform(app, my.as_ptr(), input, &mut out), TeoResult::Success);

        let mut text: *mut c_char = ptr::null_mut();
        assert_eq!(teo_value_into_string(out, &mut text), TeoResult::Success);
        assert_eq!(from_c_string(text), EMAIL);
        teo_string_free(text);

        // Input, callback output and result handles are all gone
        assert_eq!(teo_value_handle_count(), before);

        assert_eq!(teo_app_shutdown(app), TeoResult::Success);
        assert_eq!(runner.join().unwrap(), TeoResult::Success);

        let input = teo_value_from_null();
        assert_eq!(
            teo_app_transform(app, my.as_ptr(), input, &mut out),
            TeoResult::AppStopped
        );
        teo_value_free(input);
        teo_app_free(app);
    }
}

#[test]
#[serial]
fn test_validator_mapping_through_the_loop() {
    unsafe {
        let builder = new_builder("Go", "1.22");
        let non_empty_name = to_c_string("non_empty");
        let bad_name = to_c_string("bad");
        teo_app_builder_validate(builder, non_empty_name.as_ptr(), Some(non_empty));
        teo_app_builder_validate(builder, bad_name.as_ptr(), Some(returns_int));
        teo_app_builder_load(builder, ptr::null());

        let mut app = ptr::null_mut();
        assert_eq!(teo_app_builder_build(builder, &mut app), TeoResult::Success);
        teo_app_builder_free(builder);
        let runner = spawn_run(app);

        let mut valid = false;
        let mut reason: *mut c_char = ptr::null_mut();

        let text = to_c_string("abc");
        let mut input = TeoValue { id: 0 };
        teo_value_from_string(text.as_ptr(), &mut input);
        assert_eq!(
            teo_app_validate(app, non_empty_name.as_ptr(), input, &mut valid, &mut reason),
            TeoResult::Success
        );
        assert!(valid);
        assert!(reason.is_null());

        let empty = to_c_string("");
        teo_value_from_string(empty.as_ptr(), &mut input);
        assert_eq!(
            teo_app_validate(app, non_empty_name.as_ptr(), input, &mut valid, &mut reason),
            TeoResult::Success
        );
        assert!(!valid);
        assert_eq!(from_c_string(reason), "must not be empty");
        assert_eq!(teo_string_free(reason), TeoResult::Success);

        let input = teo_value_from_null();
        assert_eq!(
            teo_app_validate(app, bad_name.as_ptr(), input, &mut valid, ptr::null_mut()),
            TeoResult::TypeMismatch
        );

        let missing = to_c_string("missing");
        let input = teo_value_from_null();
        assert_eq!(teo_app_perform(app, missing.as_ptr(), input), TeoResult::HookNotFound);

        teo_app_shutdown(app);
        assert_eq!(runner.join().unwrap(), TeoResult::Success);
        teo_app_free(app);
    }
}

#[test]
#[serial]
fn test_reject_duplicates() {
    unsafe {
        let builder = new_builder("Java", "21");
        let name = to_c_string("my");
        assert_eq!(teo_app_builder_set_reject_duplicates(builder, true), TeoResult::Success);
        assert_eq!(
            teo_app_builder_transform(builder, name.as_ptr(), Some(my_transform)),
            TeoResult::Success
        );
        assert_eq!(
            teo_app_builder_transform(builder, name.as_ptr(), Some(my_transform)),
            TeoResult::DuplicateRegistration
        );
        assert!(from_c_string(teo_get_last_error()).contains("my"));
        teo_app_builder_free(builder);
    }
}

static BUILT_WITH: AtomicPtr<TeoApp> = AtomicPtr::new(ptr::null_mut());

extern "C" fn keep_app(app: *mut TeoApp) {
    BUILT_WITH.store(app, Ordering::SeqCst);
}

#[test]
#[serial]
fn test_build_with_hands_over_the_app() {
    unsafe {
        let builder = new_builder("C", "14.0.0");
        teo_app_builder_load(builder, ptr::null());
        assert_eq!(teo_app_builder_build_with(builder, Some(keep_app)), TeoResult::Success);
        assert_eq!(
            teo_app_builder_build_with(builder, Some(keep_app)),
            TeoResult::BuilderAlreadyConsumed
        );
        teo_app_builder_free(builder);

        let app = BUILT_WITH.swap(ptr::null_mut(), Ordering::SeqCst);
        assert!(!app.is_null());
        teo_app_free(app);
    }
}
