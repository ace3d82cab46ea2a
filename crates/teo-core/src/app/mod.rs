//! Built applications and their run loop
//!
//! An [`App`] owns the frozen hook registry produced by its builder. Calling
//! [`App::run`] enters the main loop, which serves hook invocations queued
//! through [`AppHandle`]s one at a time until the app's [`ShutdownHandle`]
//! fires. Because the loop is the only place hooks execute, a hook is never
//! invoked concurrently with itself.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use teo_core::{AppBuilder, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> teo_core::Result<()> {
//! let mut builder = AppBuilder::new("Rust", "1.80");
//! builder.register_transform("shout", |v: Value| Ok(Value::from(v.into_string()?.to_uppercase())))?;
//! builder.load_schema("schema.teo")?;
//! let app = Arc::new(builder.build()?);
//!
//! let handle = app.handle();
//! let runner = tokio::spawn({
//!     let app = app.clone();
//!     async move { app.run().await }
//! });
//!
//! let out = handle.transform("shout", Value::from("hi")).await?;
//! assert_eq!(out, Value::from("HI"));
//!
//! app.shutdown_handle().shutdown();
//! runner.await.unwrap()?;
//! # Ok(())
//! # }
//! ```

mod handle;
mod shutdown;

pub use handle::AppHandle;
pub use shutdown::ShutdownHandle;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use handle::Invocation;

use crate::environment::Environment;
use crate::error::{Error, HookKind, Result};
use crate::hooks::HookRegistry;
use crate::schema::SchemaRef;

/// Serializable summary of a built app
#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub environment: Environment,
    pub schema: SchemaRef,
    pub transforms: Vec<String>,
    pub validators: Vec<String>,
    pub performers: Vec<String>,
    pub built_at: DateTime<Utc>,
    pub running: bool,
}

/// A runnable application
pub struct App {
    environment: Environment,
    schema: SchemaRef,
    hooks: Arc<HookRegistry>,
    built_at: DateTime<Utc>,
    shutdown: ShutdownHandle,
    sender: mpsc::UnboundedSender<Invocation>,
    inbox: Mutex<Option<mpsc::UnboundedReceiver<Invocation>>>,
    running: AtomicBool,
}

impl App {
    pub(crate) fn new(environment: Environment, schema: SchemaRef, hooks: HookRegistry) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        Self {
            environment,
            schema,
            hooks: Arc::new(hooks),
            built_at: Utc::now(),
            shutdown: ShutdownHandle::new(),
            sender,
            inbox: Mutex::new(Some(inbox)),
            running: AtomicBool::new(false),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Handle for queueing hook invocations
    pub fn handle(&self) -> AppHandle {
        AppHandle::new(self.sender.clone(), self.shutdown.clone())
    }

    /// Token that stops [`App::run`]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn info(&self) -> AppInfo {
        AppInfo {
            environment: self.environment.clone(),
            schema: self.schema.clone(),
            transforms: self.hooks.names(HookKind::Transform),
            validators: self.hooks.names(HookKind::Validator),
            performers: self.hooks.names(HookKind::Performer),
            built_at: self.built_at,
            running: self.is_running(),
        }
    }

    /// Serve hook invocations until shutdown is requested
    ///
    /// Returns [`Error::AlreadyRunning`] while another `run` owns the loop and
    /// [`Error::AppStopped`] once the app has been stopped. Dropping the
    /// returned future before shutdown leaves the app idle but runnable: the
    /// inbox, along with anything queued on it, is handed back for the next
    /// `run`.
    pub async fn run(&self) -> Result<()> {
        let mut guard = RunGuard::enter(self)?;

        tracing::info!(
            environment = %self.environment,
            schema = %self.schema,
            hooks = self.hooks.len(),
            "App running"
        );

        if let Some(inbox) = guard.inbox.as_mut() {
            self.serve(inbox).await;
        }

        guard.finish();
        tracing::info!("App stopped");
        Ok(())
    }

    async fn serve(&self, inbox: &mut mpsc::UnboundedReceiver<Invocation>) {
        let stop = self.shutdown.clone();
        loop {
            tokio::select! {
                biased;
                _ = stop.wait() => break,
                invocation = inbox.recv() => match invocation {
                    Some(invocation) => {
                        tracing::trace!(?invocation, "Dispatching");
                        invocation.dispatch(&self.hooks);
                    }
                    None => break,
                },
            }
        }
    }

    fn take_inbox(&self) -> Result<mpsc::UnboundedReceiver<Invocation>> {
        let mut slot = self.inbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.take() {
            Some(inbox) => Ok(inbox),
            None if self.shutdown.is_shutdown() => Err(Error::AppStopped),
            None => Err(Error::AlreadyRunning),
        }
    }
}

/// Ownership of the inbox for the duration of one `run`
///
/// Clears the running flag on every exit path. If the loop did not reach
/// [`RunGuard::finish`] the inbox goes back into its slot.
struct RunGuard<'a> {
    app: &'a App,
    inbox: Option<mpsc::UnboundedReceiver<Invocation>>,
}

impl<'a> RunGuard<'a> {
    fn enter(app: &'a App) -> Result<Self> {
        let inbox = app.take_inbox()?;
        app.running.store(true, Ordering::Release);
        Ok(Self {
            app,
            inbox: Some(inbox),
        })
    }

    /// Stop for good; anything still queued fails its caller with AppStopped
    fn finish(mut self) {
        if let Some(mut inbox) = self.inbox.take() {
            inbox.close();
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.app.running.store(false, Ordering::Release);

        if let Some(inbox) = self.inbox.take() {
            let mut slot = self
                .app
                .inbox
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = Some(inbox);
            tracing::debug!("Run loop cancelled before shutdown, inbox returned");
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("environment", &self.environment)
            .field("schema", &self.schema)
            .field("hooks", &self.hooks)
            .field("running", &self.is_running())
            .finish()
    }
}
