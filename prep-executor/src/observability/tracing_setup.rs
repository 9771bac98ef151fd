//! Global subscriber installation.

use super::{LogFormat, LogOutput, TracingConfig};
use anyhow::{Context, Result};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Returned by [`init_tracing`]; hold it for the lifetime of the program.
#[derive(Debug)]
pub struct TracingGuard {
    format: LogFormat,
    filter: String,
}

impl TracingGuard {
    /// Format the subscriber renders with.
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Filter directives in effect.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

/// Install the global subscriber described by `config`.
///
/// Invalid filter directives fall back to `info`. Fails when a global
/// subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<TracingGuard> {
    let (filter, directives) = match EnvFilter::try_new(&config.filter) {
        Ok(filter) => (filter, config.filter.clone()),
        Err(_) => (EnvFilter::new("info"), "info".to_string()),
    };

    tracing_subscriber::registry()
        .with(fmt_layer(&config))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = %config.format, filter = %directives, "Tracing initialized");
    Ok(TracingGuard {
        format: config.format,
        filter: directives,
    })
}

fn fmt_layer(config: &TracingConfig) -> BoxedLayer {
    let writer = match config.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
    };
    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(config.location)
        .with_line_number(config.location)
        .with_target(config.target);

    match config.format {
        // execution spans close with their timing in JSON output
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
