//! Engine-side entry point into a running app
//!
//! An [`AppHandle`] queues hook invocations for the app's run loop and waits
//! for the reply. Invocations queued before `run` starts are processed once
//! it does; invocations made after the loop has exited fail with
//! [`Error::AppStopped`].

use tokio::sync::{mpsc, oneshot};

use super::shutdown::ShutdownHandle;
use crate::error::{Error, Result};
use crate::hooks::{HookRegistry, Validity};
use crate::value::Value;

/// A queued hook call and the channel its result goes back on
pub(crate) enum Invocation {
    Transform {
        name: String,
        value: Value,
        reply: oneshot::Sender<Result<Value>>,
    },
    Validate {
        name: String,
        value: Value,
        reply: oneshot::Sender<Result<Validity>>,
    },
    Perform {
        name: String,
        value: Value,
        reply: oneshot::Sender<Result<()>>,
    },
}

impl Invocation {
    /// Execute against `hooks`; a caller that stopped waiting is ignored
    pub(crate) fn dispatch(self, hooks: &HookRegistry) {
        match self {
            Invocation::Transform { name, value, reply } => {
                let _ = reply.send(hooks.transform(&name, value));
            }
            Invocation::Validate { name, value, reply } => {
                let _ = reply.send(hooks.validate(&name, value));
            }
            Invocation::Perform { name, value, reply } => {
                let _ = reply.send(hooks.perform(&name, value));
            }
        }
    }
}

/// Cloneable handle used by the engine (or a test stub) to call hooks
#[derive(Debug, Clone)]
pub struct AppHandle {
    sender: mpsc::UnboundedSender<Invocation>,
    shutdown: ShutdownHandle,
}

impl AppHandle {
    pub(crate) fn new(sender: mpsc::UnboundedSender<Invocation>, shutdown: ShutdownHandle) -> Self {
        Self { sender, shutdown }
    }

    pub async fn transform(&self, name: &str, value: Value) -> Result<Value> {
        let (reply, rx) = oneshot::channel();
        self.send(Invocation::Transform {
            name: name.to_string(),
            value,
            reply,
        })?;
        rx.await.map_err(|_| Error::AppStopped)?
    }

    pub async fn validate(&self, name: &str, value: Value) -> Result<Validity> {
        let (reply, rx) = oneshot::channel();
        self.send(Invocation::Validate {
            name: name.to_string(),
            value,
            reply,
        })?;
        rx.await.map_err(|_| Error::AppStopped)?
    }

    pub async fn perform(&self, name: &str, value: Value) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Invocation::Perform {
            name: name.to_string(),
            value,
            reply,
        })?;
        rx.await.map_err(|_| Error::AppStopped)?
    }

    /// Stop the app this handle belongs to
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    fn send(&self, invocation: Invocation) -> Result<()> {
        if self.shutdown.is_shutdown() {
            return Err(Error::AppStopped);
        }
        self.sender.send(invocation).map_err(|_| Error::AppStopped)
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, name) = match self {
            Invocation::Transform { name, .. } => ("transform", name),
            Invocation::Validate { name, .. } => ("validate", name),
            Invocation::Perform { name, .. } => ("perform", name),
        };
        write!(f, "Invocation({} {})", kind, name)
    }
}
