//! Inspect command handler

use crate::cli::InspectArgs;
use crate::config::Config;
use crate::demo::build_app;
use crate::error::Result;
use crate::output::OutputWriter;
use tracing::instrument;

/// Build the demo app and print its summary without running it
#[instrument(skip_all)]
pub async fn handle_inspect(
    args: InspectArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let app = build_app(config, &args.app)?;
    output.app_info(&app.info())
}
