//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility.

/// Result codes for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeoResult {
    /// Operation completed successfully
    Success = 0,
    /// Invalid input parameters
    InvalidInput = -1,
    /// Null pointer provided
    NullPointer = -2,
    /// Invalid UTF-8 string
    Utf8Error = -3,
    /// Value tag does not match the requested type
    TypeMismatch = -4,
    /// Value handle or string was already consumed or never issued
    InvalidHandle = -5,
    /// Schema reference missing or unusable
    SchemaError = -6,
    /// Builder was already turned into an app
    BuilderAlreadyConsumed = -7,
    /// Hook name registered twice while duplicates are rejected
    DuplicateRegistration = -8,
    /// No hook with the requested name
    HookNotFound = -9,
    /// Hook returned an error
    HookFailed = -10,
    /// App loop has exited
    AppStopped = -11,
    /// App loop is already being run by another caller
    AlreadyRunning = -12,
    /// App loop has not been entered yet
    NotRunning = -13,
    /// Internal error
    InternalError = -14,
    /// Memory allocation failure
    MemoryError = -15,
}

impl TeoResult {
    /// Get a human-readable error message
    pub fn error_message(self) -> &'static str {
        match self {
            TeoResult::Success => "Success",
            TeoResult::InvalidInput => "Invalid input parameters",
            TeoResult::NullPointer => "Null pointer provided",
            TeoResult::Utf8Error => "Invalid UTF-8 string",
            TeoResult::TypeMismatch => "Type mismatch",
            TeoResult::InvalidHandle => "Invalid handle",
            TeoResult::SchemaError => "Schema error",
            TeoResult::BuilderAlreadyConsumed => "App builder already consumed",
            TeoResult::DuplicateRegistration => "Duplicate hook registration",
            TeoResult::HookNotFound => "Hook not found",
            TeoResult::HookFailed => "Hook failed",
            TeoResult::AppStopped => "App stopped",
            TeoResult::AlreadyRunning => "App already running",
            TeoResult::NotRunning => "App not running",
            TeoResult::InternalError => "Internal error",
            TeoResult::MemoryError => "Memory allocation failed",
        }
    }
}

/// Handle to a value held by the bridge
///
/// Handles are plain integers, so copying one on the host side is cheap and
/// safe. A handle is valid from the `teo_value_from_*` call that issued it
/// until it is consumed by a `teo_value_into_*` call or released with
/// `teo_value_free`. Id 0 is never issued.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeoValue {
    /// Table key
    pub id: u64,
}

impl TeoValue {
    /// The handle that never refers to a value
    pub const INVALID: TeoValue = TeoValue { id: 0 };
}

/// Opaque handle for an app builder
#[repr(C)]
pub struct TeoAppBuilder {
    _private: [u8; 0],
}

/// Opaque handle for a built app
#[repr(C)]
pub struct TeoApp {
    _private: [u8; 0],
}

/// Transform callback: receives an input handle, returns an output handle
pub type TeoTransformFn = extern "C" fn(input: TeoValue) -> TeoValue;

/// Validator callback: returns NULL for valid, a bool, or a string reason
pub type TeoValidatorFn = extern "C" fn(input: TeoValue) -> TeoValue;

/// Performer callback
pub type TeoPerformerFn = extern "C" fn(input: TeoValue);

/// Receives the app produced by `teo_app_builder_build_with`
pub type TeoAppCallback = extern "C" fn(app: *mut TeoApp);
