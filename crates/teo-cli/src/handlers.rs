//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; `main` dispatches to the
//! re-exported `handle_*` functions.

mod completions;
mod config;
mod inspect;
mod invoke;
mod run;

pub use completions::handle_completions;
pub use config::handle_config;
pub use inspect::handle_inspect;
pub use invoke::handle_invoke;
pub use run::handle_run;
