//! Named host hooks
//!
//! A hook is a host function the engine calls at a schema-defined extension
//! point. There are three namespaces, one per [`HookKind`], and names are
//! unique inside a namespace only: a transform and a validator may both be
//! called `email`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, HookKind, Result};
use crate::value::Value;

/// `Value -> Value`
pub type Transform = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// `Value -> Validity`
pub type Validator = Arc<dyn Fn(Value) -> Result<Validity> + Send + Sync>;

/// `Value -> ()`
pub type Performer = Arc<dyn Fn(Value) -> Result<()> + Send + Sync>;

/// Outcome of a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Validity {
    Valid,
    Invalid(String),
}

/// Reason reported when a validator answers `false`
pub const DEFAULT_INVALID_REASON: &str = "value is invalid";

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(reason) => Some(reason),
        }
    }
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid(DEFAULT_INVALID_REASON.to_string())
        }
    }
}

impl From<&str> for Validity {
    fn from(reason: &str) -> Self {
        Validity::Invalid(reason.to_string())
    }
}

impl From<String> for Validity {
    fn from(reason: String) -> Self {
        Validity::Invalid(reason)
    }
}

/// Validator answers carried as values: null is valid, a bool is read as
/// valid/invalid and a string is the reason the value is invalid
impl TryFrom<Value> for Validity {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Validity::Valid),
            Value::Bool(valid) => Ok(valid.into()),
            Value::String(reason) => Ok(Validity::Invalid(reason)),
            other => Err(Error::TypeMismatch {
                expected: crate::value::ValueKind::Bool,
                found: other.kind(),
            }),
        }
    }
}

/// What to do when a name is registered twice in one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Last registration wins
    #[default]
    Overwrite,
    /// Second registration fails with `DuplicateRegistration`
    Reject,
}

/// Hooks of all three namespaces
#[derive(Clone, Default)]
pub struct HookRegistry {
    transforms: BTreeMap<String, Transform>,
    validators: BTreeMap<String, Validator>,
    performers: BTreeMap<String, Performer>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_transform(
        &mut self,
        name: String,
        hook: Transform,
        policy: RegistrationPolicy,
    ) -> Result<()> {
        insert(&mut self.transforms, HookKind::Transform, name, hook, policy)
    }

    pub(crate) fn insert_validator(
        &mut self,
        name: String,
        hook: Validator,
        policy: RegistrationPolicy,
    ) -> Result<()> {
        insert(&mut self.validators, HookKind::Validator, name, hook, policy)
    }

    pub(crate) fn insert_performer(
        &mut self,
        name: String,
        hook: Performer,
        policy: RegistrationPolicy,
    ) -> Result<()> {
        insert(&mut self.performers, HookKind::Performer, name, hook, policy)
    }

    /// Run the transform registered under `name`
    pub fn transform(&self, name: &str, value: Value) -> Result<Value> {
        let hook = lookup(&self.transforms, HookKind::Transform, name)?;
        invoke(HookKind::Transform, name, || hook(value))
    }

    /// Run the validator registered under `name`
    pub fn validate(&self, name: &str, value: Value) -> Result<Validity> {
        let hook = lookup(&self.validators, HookKind::Validator, name)?;
        invoke(HookKind::Validator, name, || hook(value))
    }

    /// Run the performer registered under `name`
    pub fn perform(&self, name: &str, value: Value) -> Result<()> {
        let hook = lookup(&self.performers, HookKind::Performer, name)?;
        invoke(HookKind::Performer, name, || hook(value))
    }

    pub fn contains(&self, kind: HookKind, name: &str) -> bool {
        match kind {
            HookKind::Transform => self.transforms.contains_key(name),
            HookKind::Validator => self.validators.contains_key(name),
            HookKind::Performer => self.performers.contains_key(name),
        }
    }

    /// Registered names of one namespace, sorted
    pub fn names(&self, kind: HookKind) -> Vec<String> {
        match kind {
            HookKind::Transform => self.transforms.keys().cloned().collect(),
            HookKind::Validator => self.validators.keys().cloned().collect(),
            HookKind::Performer => self.performers.keys().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len() + self.validators.len() + self.performers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("transforms", &self.names(HookKind::Transform))
            .field("validators", &self.names(HookKind::Validator))
            .field("performers", &self.names(HookKind::Performer))
            .finish()
    }
}

fn insert<T>(
    map: &mut BTreeMap<String, T>,
    kind: HookKind,
    name: String,
    hook: T,
    policy: RegistrationPolicy,
) -> Result<()> {
    if map.contains_key(&name) {
        match policy {
            RegistrationPolicy::Reject => {
                return Err(Error::DuplicateRegistration { kind, name });
            }
            RegistrationPolicy::Overwrite => {
                tracing::debug!(%kind, name = %name, "Replacing previously registered hook");
            }
        }
    }
    map.insert(name, hook);
    Ok(())
}

fn lookup<'a, T>(map: &'a BTreeMap<String, T>, kind: HookKind, name: &str) -> Result<&'a T> {
    map.get(name).ok_or_else(|| Error::HookNotFound {
        kind,
        name: name.to_string(),
    })
}

/// Call a hook, turning a panic into a hook error
fn invoke<R>(kind: HookKind, name: &str, call: impl FnOnce() -> Result<R>) -> Result<R> {
    let _span = tracing::trace_span!("hook", %kind, name).entered();
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => {
            tracing::warn!(%kind, name, error = %e, "Hook returned an error");
            Err(e)
        }
        Err(panic_info) => {
            let msg = panic_message(&panic_info);
            tracing::error!(%kind, name, panic = %msg, "Hook panicked");
            Err(Error::hook(kind, name, format!("panicked: {}", msg)))
        }
    }
}

fn panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
