//! Structured logging.
//!
//! Library code only emits `tracing` events. A binary installs one
//! subscriber with [`init_tracing`], usually from
//! [`EngineConfig::tracing_config`](crate::config::EngineConfig::tracing_config)
//! or [`TracingConfig::from_env`].
//!
//! Every [`Pipeline::execute`](crate::pipeline::Pipeline::execute) runs
//! inside an `execution` span carrying the execution id, so events of
//! concurrent executions can be told apart.

mod config;
mod tracing_setup;

pub use config::{LogFormat, LogOutput, TracingConfig};
pub use tracing_setup::{TracingGuard, init_tracing};

/// Span covering one pipeline execution.
#[macro_export]
macro_rules! instrument_execution {
    ($execution_id:expr, $actions:expr) => {
        tracing::info_span!(
            "execution",
            execution_id = %$execution_id,
            actions = $actions
        )
    };
}
