//! Teo Core - value marshaling and application bootstrap for Teo hosts
//!
//! This crate provides the native side of the contract a host language uses
//! to drive a Teo application: a dynamic [`Value`] model, named hooks, a
//! builder that is consumed exactly once, and an [`App`] whose run loop
//! stops on an explicit shutdown signal.
//!
//! # Main Components
//!
//! - **Values**: tagged union with checked conversions to and from host primitives
//! - **Hooks**: transform / validator / performer callbacks stored by name
//! - **Builder**: `Created -> Registering -> Loaded -> Built` state machine
//! - **App**: run loop, stub-engine [`AppHandle`], [`ShutdownHandle`]
//!
//! # Example
//!
//! ```
//! use teo_core::{AppBuilder, Error, Result, Value};
//!
//! fn example() -> Result<()> {
//!     let mut builder = AppBuilder::new("C", "14.0.0");
//!     builder.register_transform("my", |_| Ok(Value::from("abcqqoqxx@gmaaa.com")))?;
//!     builder.load_schema("schema.teo")?;
//!     let app = builder.build()?;
//!
//!     let out = app.hooks().transform("my", Value::from(1i32))?;
//!     assert_eq!(out.into_string()?, "abcqqoqxx@gmaaa.com");
//!
//!     assert!(matches!(builder.build(), Err(Error::BuilderAlreadyConsumed)));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod app;
pub mod builder;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod schema;
pub mod value;

// Re-export main types for convenience
pub use app::{App, AppHandle, AppInfo, ShutdownHandle};
pub use builder::{AppBuilder, BuilderState};
pub use environment::{Environment, Language};
pub use error::{Error, HookKind, Result};
pub use hooks::{HookRegistry, RegistrationPolicy, Validity};
pub use schema::SchemaRef;
pub use value::{Value, ValueKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
