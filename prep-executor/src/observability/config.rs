//! Log output settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::IsTerminal;

/// How log events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, span fields flattened.
    Json,
    /// Multi-line, colored.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
}

impl LogFormat {
    /// Parse a format name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    /// Pretty when stderr is a terminal, compact otherwise.
    pub fn detect() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Pretty
        } else {
            Self::Compact
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream the subscriber writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Keeps stdout free for datasets written by the CLI.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// Subscriber settings consumed by [`init_tracing`](super::init_tracing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Rendering.
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `warn,prep_executor=debug`.
    pub filter: String,
    /// Include file and line of each event.
    pub location: bool,
    /// Include the module path of each event.
    pub target: bool,
    /// Destination stream.
    pub output: LogOutput,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
            location: false,
            target: true,
            output: LogOutput::default(),
        }
    }
}

impl TracingConfig {
    /// Settings from the process environment.
    ///
    /// - `PREP_LOG_FORMAT`: `json`, `pretty` or `compact`; detected from the
    ///   terminal when absent or unknown
    /// - `PREP_LOG_LEVEL`, then `RUST_LOG`: filter directives
    /// - `PREP_LOG_LOCATION`: `true` or `1` to include file and line
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = lookup("PREP_LOG_FORMAT")
            .and_then(|value| LogFormat::parse(&value))
            .unwrap_or_else(LogFormat::detect);
        let filter = lookup("PREP_LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        let location = lookup("PREP_LOG_LOCATION").is_some_and(|value| value == "true" || value == "1");

        Self {
            format,
            filter,
            location,
            ..Self::default()
        }
    }

    /// Set the format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Include or omit file and line.
    #[must_use]
    pub fn with_location(mut self, location: bool) -> Self {
        self.location = location;
        self
    }

    /// Set the destination stream.
    #[must_use]
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }
}
