//! Prep Executor - Runs action lists over row streams.
//!
//! This crate provides:
//! - The two-phase [`executor`] (compile once, then apply per row)
//! - A push-based dataflow [`graph`] with signals and visitors
//! - The [`pipeline`] builder wiring both together
//! - Output [`writer`]s and row [`diff`]s for previews
//! - Engine [`config`]uration and [`observability`] setup

#![warn(missing_docs)]

pub mod config;
pub mod diff;
pub mod executor;
pub mod graph;
pub mod observability;
pub mod pipeline;
pub mod writer;

pub use config::EngineConfig;
pub use executor::Executor;
pub use pipeline::{ExecutionSummary, Pipeline, PipelineBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::diff::{preview, preview_diff};
    pub use crate::executor::Executor;
    pub use crate::graph::{
        ActionNode, BasicLink, CloneLink, CollectorNode, FilterNode, GraphDump, LimitNode, Link,
        Node, NodeBuilder, NullLink, Signal, SourceNode, StopToken, Visitor, WriterNode, walk,
    };
    pub use crate::observability::{LogFormat, LogOutput, TracingConfig, init_tracing};
    pub use crate::pipeline::{ExecutionSummary, Pipeline, PipelineBuilder};
    pub use crate::writer::{CollectingWriter, JsonWriter, Writer};
}
