//! Demo hooks and app construction shared by the subcommands

use crate::cli::AppArgs;
use crate::config::Config;
use crate::error::Result;
use teo_core::{App, AppBuilder, RegistrationPolicy, Validity, Value};

/// What the `my` transform answers for any input
pub const DEMO_EMAIL: &str = "abcqqoqxx@gmaaa.com";

/// Register the fixed demo hook set on `builder`
///
/// | namespace | name        | behavior                                   |
/// |-----------|-------------|--------------------------------------------|
/// | transform | `my`        | ignores its input, returns [`DEMO_EMAIL`]  |
/// | transform | `upper`     | upper-cases a string                       |
/// | validator | `non_empty` | null and blank strings are invalid         |
/// | performer | `log`       | logs the value at info level               |
pub fn register_demo_hooks(builder: &mut AppBuilder) -> teo_core::Result<()> {
    builder
        .register_transform("my", |_| Ok(Value::from(DEMO_EMAIL)))?
        .register_transform("upper", |value: Value| {
            Ok(Value::from(value.into_string()?.to_uppercase()))
        })?
        .register_validator("non_empty", |value: Value| {
            let validity = match value.as_str() {
                _ if value.is_null() => Validity::Invalid("value is null".to_string()),
                Some(s) if s.trim().is_empty() => Validity::Invalid("value is blank".to_string()),
                _ => Validity::Valid,
            };
            Ok(validity)
        })?
        .register_performer("log", |value: Value| {
            tracing::info!(value = %value, kind = ?value.kind(), "Performer invoked");
            Ok(())
        })?;
    Ok(())
}

/// Build the demo app from the configuration and command-line overrides
pub fn build_app(config: &Config, args: &AppArgs) -> Result<App> {
    let language = args.lang.as_deref().unwrap_or(&config.environment.language);
    let version = args
        .lang_version
        .as_deref()
        .unwrap_or(&config.environment.version);
    let policy = if args.reject_duplicates {
        RegistrationPolicy::Reject
    } else {
        config.registration
    };
    let schema = args.schema.as_deref().unwrap_or(&config.schema);

    let mut builder = AppBuilder::new(language, version);
    builder.registration_policy(policy)?;
    register_demo_hooks(&mut builder)?;
    builder.load_schema(schema)?;

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teo_core::{Error, HookKind};

    #[test]
    fn test_demo_hooks() {
        let app = build_app(&Config::default(), &AppArgs::default()).unwrap();
        let hooks = app.hooks();

        let out = hooks.transform("my", Value::from(42i32)).unwrap();
        assert_eq!(out.into_string().unwrap(), DEMO_EMAIL);

        let out = hooks.transform("upper", Value::from("teo")).unwrap();
        assert_eq!(out.into_string().unwrap(), "TEO");
        assert!(matches!(
            hooks.transform("upper", Value::from(1i32)),
            Err(Error::TypeMismatch { .. })
        ));

        assert!(hooks.validate("non_empty", Value::from("x")).unwrap().is_valid());
        assert!(!hooks.validate("non_empty", Value::from("  ")).unwrap().is_valid());
        assert!(!hooks.validate("non_empty", Value::Null).unwrap().is_valid());
        assert!(hooks.validate("non_empty", Value::from(0i32)).unwrap().is_valid());

        hooks.perform("log", Value::from(true)).unwrap();
        assert!(hooks.contains(HookKind::Performer, "log"));
    }

    #[test]
    fn test_args_override_config() {
        let mut config = Config::default();
        config.environment.language = "Go".into();
        config.environment.version = "1.22".into();

        let args = AppArgs {
            schema: Some("other.teo".into()),
            lang: Some("Java".into()),
            ..AppArgs::default()
        };
        let app = build_app(&config, &args).unwrap();
        assert_eq!(app.environment().language.to_string(), "Java");
        assert_eq!(app.environment().version, "1.22");
        assert_eq!(app.schema().as_str(), "other.teo");
    }

    #[test]
    fn test_bad_schema_fails_the_build() {
        let args = AppArgs {
            schema: Some("schema.json".into()),
            ..AppArgs::default()
        };
        let err = build_app(&Config::default(), &args).unwrap_err();
        assert!(matches!(err, crate::error::Error::Core(Error::Schema { .. })));
    }
}
