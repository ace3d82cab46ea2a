//! Invoke command handler

use crate::cli::{InvokeArgs, OutputFormat};
use crate::config::Config;
use crate::demo::build_app;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{format_value_compact, OutputWriter};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use teo_core::{AppHandle, HookKind, Validity, Value};
use tracing::{debug, instrument};

/// Result of a single hook invocation
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutcome {
    Transformed(Value),
    Validated(Validity),
    Performed,
}

/// Machine-readable record of an invocation
#[derive(Debug, Serialize)]
pub struct InvokeReport {
    pub kind: HookKind,
    pub name: String,
    pub input: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
}

/// Handle the invoke command
///
/// The app is run for the duration of one invocation and shut down
/// afterwards, whether or not the hook succeeded.
#[instrument(skip_all)]
pub async fn handle_invoke(
    args: InvokeArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let (kind, name) = args.target.resolve()?;
    let _timer = Timer::with_details("invoke_command", &format!("{} {}", kind, name));

    let input_json: JsonValue = serde_json::from_str(&args.input)?;
    let input = Value::from_json(&input_json)?;
    debug!(%kind, hook = name, input = ?input, "Invoking hook");

    let app = Arc::new(build_app(config, &args.app)?);
    let runner = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run().await })
    };

    let outcome = invoke_once(&app.handle(), kind, name, input.clone()).await;

    app.shutdown_handle().shutdown();
    runner
        .await
        .map_err(|e| Error::other(format!("Run loop task failed: {}", e)))??;
    let outcome = outcome?;

    if output.format() == OutputFormat::Human {
        write_human(output, kind, name, &input, &outcome)
    } else {
        output.data(&report(kind, name, input_json, outcome))
    }
}

/// Route one call through the app's stub engine
pub async fn invoke_once(
    handle: &AppHandle,
    kind: HookKind,
    name: &str,
    input: Value,
) -> teo_core::Result<InvokeOutcome> {
    match kind {
        HookKind::Transform => handle.transform(name, input).await.map(InvokeOutcome::Transformed),
        HookKind::Validator => handle.validate(name, input).await.map(InvokeOutcome::Validated),
        HookKind::Performer => handle.perform(name, input).await.map(|()| InvokeOutcome::Performed),
    }
}

fn report(kind: HookKind, name: &str, input: JsonValue, outcome: InvokeOutcome) -> InvokeReport {
    let (output, validity) = match outcome {
        InvokeOutcome::Transformed(value) => (Some(value.to_json()), None),
        InvokeOutcome::Validated(validity) => (None, Some(validity)),
        InvokeOutcome::Performed => (None, None),
    };
    InvokeReport {
        kind,
        name: name.to_string(),
        input,
        output,
        validity,
    }
}

fn write_human(
    output: &mut OutputWriter,
    kind: HookKind,
    name: &str,
    input: &Value,
    outcome: &InvokeOutcome,
) -> Result<()> {
    output.section(&format!("{} {}", kind, name))?;
    output.key_value("input", &format_value_compact(input))?;

    match outcome {
        InvokeOutcome::Transformed(value) => output.key_value("output", &format_value_compact(value)),
        InvokeOutcome::Validated(Validity::Valid) => output.success("✓ valid"),
        InvokeOutcome::Validated(Validity::Invalid(reason)) => {
            output.warning(&format!("✗ invalid: {}", reason))
        }
        InvokeOutcome::Performed => output.success("✓ performed"),
    }
}
