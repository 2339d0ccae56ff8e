use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, LogLevel, LoggingConfig, ServiceConfig};

/// Environment variables that override values from `config.toml`.
const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("SUPABASE_URL", "service.url"),
    ("SUPABASE_KEY", "service.key"),
    ("SUPABASE_TIMEOUT_SECS", "service.timeout_secs"),
    ("ATLAS_LOG_LEVEL", "logging.level"),
    ("ATLAS_LOG_DIR", "logging.directory"),
];

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. It loads a `.env`
/// file when one exists, then layers built-in defaults, an optional
/// `config.toml` and the process environment, deserializes the result into
/// our strongly-typed `Config` struct and validates it.
pub fn load_config() -> Result<Config, ConfigError> {
    // A missing .env file is fine; the variables may come from the real environment.
    let _ = dotenvy::dotenv();
    let vars: HashMap<String, String> = std::env::vars().collect();
    load_config_with(Path::new("config.toml"), &vars)
}

/// Builds the configuration from an explicit file path and variable set.
pub fn load_config_with(
    file: &Path,
    vars: &HashMap<String, String>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("service.url", "")?
        .set_default("service.key", "")?
        .add_source(config::File::from(file).required(false));

    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(key, vars.get(var).cloned())?;
    }

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.service.url.trim().is_empty() {
        return Err(ConfigError::ValidationError("SUPABASE_URL is not set".to_string()));
    }
    if config.service.key.trim().is_empty() {
        return Err(ConfigError::ValidationError("SUPABASE_KEY is not set".to_string()));
    }
    if config.service.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "service timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn no_file() -> &'static Path {
        Path::new("/nonexistent/atlas/config.toml")
    }

    #[test]
    fn reads_credentials_from_environment() {
        let env = vars(&[("SUPABASE_URL", "https://demo.supabase.co"), ("SUPABASE_KEY", "anon")]);
        let config = load_config_with(no_file(), &env).unwrap();
        assert_eq!(config.service.url, "https://demo.supabase.co");
        assert_eq!(config.service.key, "anon");
        assert_eq!(config.service.timeout(), None);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.file_prefix, "atlas.log");
    }

    #[test]
    fn missing_url_is_a_validation_error() {
        let env = vars(&[("SUPABASE_KEY", "anon")]);
        let err = load_config_with(no_file(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("SUPABASE_URL")));
    }

    #[test]
    fn blank_key_is_a_validation_error() {
        let env = vars(&[("SUPABASE_URL", "https://demo.supabase.co"), ("SUPABASE_KEY", "  ")]);
        let err = load_config_with(no_file(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("SUPABASE_KEY")));
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[service]\nurl = \"https://file.example\"\nkey = \"file-key\"\ntimeout_secs = 7\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let env = vars(&[("SUPABASE_KEY", "env-key")]);
        let config = load_config_with(file.path(), &env).unwrap();
        assert_eq!(config.service.url, "https://file.example");
        assert_eq!(config.service.key, "env-key");
        assert_eq!(config.service.timeout(), Some(Duration::from_secs(7)));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let env = vars(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_KEY", "anon"),
            ("SUPABASE_TIMEOUT_SECS", "0"),
        ]);
        assert!(matches!(
            load_config_with(no_file(), &env),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let env = vars(&[("SUPABASE_URL", "https://demo.supabase.co"), ("SUPABASE_KEY", "secret-key")]);
        let config = load_config_with(no_file(), &env).unwrap();
        let printed = format!("{:?}", config.service);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<redacted>"));
    }
}
