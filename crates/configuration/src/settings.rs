use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the hosted REST backend.
#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base endpoint of the project, e.g. `https://abc.supabase.co`.
    #[serde(default)]
    pub url: String,
    /// The project API key sent with every request.
    #[serde(default)]
    pub key: String,
    /// Default per-request timeout. `None` leaves the transport default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// The key is a credential; keep it out of debug output and logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where and how verbosely the application logs.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Directory for the daily rolling log file. No file is written when unset.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "atlas.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as an `EnvFilter` directive.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}
