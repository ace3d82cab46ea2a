//! Run command handler

use crate::cli::{OutputFormat, RunArgs};
use crate::config::Config;
use crate::demo::build_app;
use crate::error::{Error, Result};
use crate::logging::{current_run_id, timing::Timer};
use crate::output::OutputWriter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use teo_core::{Environment, SchemaRef};
use tracing::{info, instrument};

/// Why the run loop was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    Interrupted,
    Timeout,
}

/// Printed once the app has stopped
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Option<String>,
    pub environment: Environment,
    pub schema: SchemaRef,
    pub stopped_by: StopReason,
    pub uptime_ms: u64,
}

/// Handle the run command
///
/// Builds the demo app, runs it on a background task and shuts it down on
/// Ctrl-C or after the timeout, whichever comes first.
#[instrument(skip_all, fields(timeout = ?args.timeout))]
pub async fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::new("run_command");

    let app = Arc::new(build_app(config, &args.app)?);
    let shutdown = app.shutdown_handle();
    let runner = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run().await })
    };

    output.info(&format!(
        "Running {} app with schema {}",
        app.environment(),
        app.schema()
    ))?;
    let spinner = if config.output.progress {
        output.spinner("App running, press Ctrl-C to stop")
    } else {
        None
    };

    let timeout = args.timeout.or(config.run.timeout_secs);
    let stopped_by = wait_for_stop(timeout).await?;
    info!(?stopped_by, "Stopping app");

    shutdown.shutdown();
    runner
        .await
        .map_err(|e| Error::other(format!("Run loop task failed: {}", e)))??;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let summary = RunSummary {
        run_id: current_run_id().map(str::to_string),
        environment: app.environment().clone(),
        schema: app.schema().clone(),
        stopped_by,
        uptime_ms: timer.elapsed().as_millis() as u64,
    };

    if output.format() == OutputFormat::Human {
        output.success(&format!("✓ App stopped ({:?})", summary.stopped_by))?;
        output.key_value("uptime", &format!("{}ms", summary.uptime_ms))
    } else {
        output.data(&summary)
    }
}

async fn wait_for_stop(timeout: Option<u64>) -> Result<StopReason> {
    match timeout {
        Some(secs) => {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    Ok(StopReason::Interrupted)
                }
                _ = tokio::time::sleep(Duration::from_secs(secs)) => Ok(StopReason::Timeout),
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            Ok(StopReason::Interrupted)
        }
    }
}
