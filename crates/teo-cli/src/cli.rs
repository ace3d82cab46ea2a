//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use teo_core::HookKind;

use crate::error::{Error, Result};

/// Teo demo host - build, run and poke a Teo app from the command line
///
/// Builds an app with a fixed set of demo hooks, then runs it until
/// interrupted or invokes a single hook through the stub engine.
#[derive(Parser, Debug)]
#[command(
    name = "teo",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the demo app and run it until Ctrl-C or a timeout
    Run(RunArgs),

    /// Build the demo app, invoke one hook and shut down
    Invoke(InvokeArgs),

    /// Build the demo app and describe it
    Inspect(InspectArgs),

    /// Manage configuration files
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Options shared by every command that builds an app
#[derive(Args, Debug, Clone, Default)]
pub struct AppArgs {
    /// Schema source reference (defaults to the configured schema)
    #[arg(long, value_name = "PATH")]
    pub schema: Option<String>,

    /// Host language identifier reported to the app
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Host language version reported to the app
    #[arg(long, value_name = "VERSION")]
    pub lang_version: Option<String>,

    /// Fail if a hook name is registered twice
    #[arg(long)]
    pub reject_duplicates: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub app: AppArgs,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for the invoke command
#[derive(Parser, Debug)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub app: AppArgs,

    #[command(flatten)]
    pub target: HookTarget,

    /// Input value as JSON (null, bool, number or string)
    #[arg(long, default_value = "null")]
    pub input: String,
}

/// Exactly one hook to invoke
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct HookTarget {
    /// Name of the transform to invoke
    #[arg(long, value_name = "NAME")]
    pub transform: Option<String>,

    /// Name of the validator to invoke
    #[arg(long, value_name = "NAME")]
    pub validate: Option<String>,

    /// Name of the performer to invoke
    #[arg(long, value_name = "NAME")]
    pub perform: Option<String>,
}

impl HookTarget {
    /// The namespace and name selected on the command line
    pub fn resolve(&self) -> Result<(HookKind, &str)> {
        match (&self.transform, &self.validate, &self.perform) {
            (Some(name), None, None) => Ok((HookKind::Transform, name)),
            (None, Some(name), None) => Ok((HookKind::Validator, name)),
            (None, None, Some(name)) => Ok((HookKind::Performer, name)),
            _ => Err(Error::invalid_args(
                "exactly one of --transform, --validate or --perform is required",
            )),
        }
    }
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub app: AppArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a configuration file with default values
    Init(ConfigInitArgs),
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file; the extension picks the format
    #[arg(value_name = "PATH", default_value = "teo.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
