//! Staged construction of an [`App`]
//!
//! ```text
//! Created -> (Registering)* -> Loaded -> Built
//! ```
//!
//! A builder is consumed exactly once. Every call made after a successful
//! build fails with [`Error::BuilderAlreadyConsumed`]. A build that fails
//! (missing or malformed schema reference) leaves the builder untouched so the
//! host can fix the reference and try again.

use std::sync::Arc;

use serde::Serialize;

use crate::app::App;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::hooks::{HookRegistry, RegistrationPolicy, Validity};
use crate::schema::SchemaRef;
use crate::value::Value;

/// Lifecycle position of an [`AppBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderState {
    Created,
    Registering,
    Loaded,
    Built,
}

/// Accumulates hooks and a schema reference, then produces an [`App`]
#[derive(Debug)]
pub struct AppBuilder {
    environment: Environment,
    schema: Option<String>,
    hooks: HookRegistry,
    policy: RegistrationPolicy,
    state: BuilderState,
}

impl AppBuilder {
    /// Create a builder for a host identified by language and version
    pub fn new(lang_id: &str, lang_version: &str) -> Self {
        Self::with_environment(Environment::new(lang_id, lang_version))
    }

    pub fn with_environment(environment: Environment) -> Self {
        tracing::debug!(environment = %environment, "Creating app builder");
        Self {
            environment,
            schema: None,
            hooks: HookRegistry::new(),
            policy: RegistrationPolicy::default(),
            state: BuilderState::Created,
        }
    }

    /// Choose how duplicate hook names are handled
    pub fn registration_policy(&mut self, policy: RegistrationPolicy) -> Result<&mut Self> {
        self.ensure_open()?;
        self.policy = policy;
        Ok(self)
    }

    /// Register a `Value -> Value` hook
    pub fn register_transform<F>(&mut self, name: impl Into<String>, transform: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.hooks.insert_transform(name.into(), Arc::new(transform), self.policy)?;
        self.mark_registering();
        Ok(self)
    }

    /// Register a validator; plain `bool` answers are accepted
    pub fn register_validator<F, V>(&mut self, name: impl Into<String>, validator: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> Result<V> + Send + Sync + 'static,
        V: Into<Validity>,
    {
        self.ensure_open()?;
        let hook = move |value: Value| -> Result<Validity> { validator(value).map(Into::into) };
        self.hooks.insert_validator(name.into(), Arc::new(hook), self.policy)?;
        self.mark_registering();
        Ok(self)
    }

    /// Register a `Value -> ()` hook
    pub fn register_performer<F>(&mut self, name: impl Into<String>, performer: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> Result<()> + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.hooks.insert_performer(name.into(), Arc::new(performer), self.policy)?;
        self.mark_registering();
        Ok(self)
    }

    /// Record the schema location; it is checked at build time
    pub fn load_schema(&mut self, source_ref: impl Into<String>) -> Result<&mut Self> {
        self.ensure_open()?;
        let source_ref = source_ref.into();
        tracing::debug!(schema = %source_ref, "Schema reference recorded");
        self.schema = Some(source_ref);
        self.state = BuilderState::Loaded;
        Ok(self)
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Consume the accumulated configuration and produce an app
    pub fn build(&mut self) -> Result<App> {
        self.ensure_open()?;
        let source_ref = self
            .schema
            .as_deref()
            .ok_or_else(|| Error::schema("missing schema", None))?;
        let schema = SchemaRef::parse(source_ref)?;

        let hooks = std::mem::take(&mut self.hooks);
        self.state = BuilderState::Built;

        tracing::info!(
            environment = %self.environment,
            schema = %schema,
            hooks = hooks.len(),
            "App built"
        );
        Ok(App::new(self.environment.clone(), schema, hooks))
    }

    /// Build, then hand the app to `callback` before returning
    pub fn build_with<F, R>(&mut self, callback: F) -> Result<R>
    where
        F: FnOnce(App) -> R,
    {
        let app = self.build()?;
        Ok(callback(app))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == BuilderState::Built {
            Err(Error::BuilderAlreadyConsumed)
        } else {
            Ok(())
        }
    }

    fn mark_registering(&mut self) {
        if self.state == BuilderState::Created {
            self.state = BuilderState::Registering;
        }
    }
}
