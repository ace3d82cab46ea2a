//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
    }
}

/// Print the effective configuration
fn handle_config_show(
    args: ConfigShowArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    output.writeln(content.trim_end())
}

/// Write a default configuration file
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(Error::config(format!(
            "{} already exists, pass --force to overwrite it",
            args.path.display()
        )));
    }

    Config::default().save(&args.path)?;
    output.success(&format!("✓ Created config at {}", args.path.display()))?;
    output.info("Edit it to customize settings for your environment.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer() -> (OutputWriter, Sink) {
        let sink = Sink::default();
        let output =
            OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(sink.clone()));
        (output, sink)
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("teo.toml");
        let (mut output, _) = writer();

        let init = |force| ConfigInitArgs {
            path: path.clone(),
            force,
        };

        handle_config_init(init(false), &mut output).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        let err = handle_config_init(init(false), &mut output).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        handle_config_init(init(true), &mut output).unwrap();
    }

    #[test]
    fn test_show_formats() {
        let config = Config::default();

        for (format, needle) in [
            (ConfigFormat::Yaml, "schema: schema.teo"),
            (ConfigFormat::Toml, "schema = \"schema.teo\""),
            (ConfigFormat::Json, "\"schema\": \"schema.teo\""),
        ] {
            let (mut output, sink) = writer();
            handle_config_show(ConfigShowArgs { format }, &config, &mut output).unwrap();
            let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
            assert!(text.contains(needle), "{:?}: {}", format, text);
        }
    }
}
