//! Prep Core - Row model, action contract and step chain.
//!
//! This crate provides the building blocks shared by the executor and the
//! action implementations:
//! - Row and schema value types ([`row`])
//! - Action definitions, scope validation and per-execution context ([`action`])
//! - Immutable preparation history and its replay ([`preparation`])
//! - Error taxonomy with stable codes ([`error`])

#![warn(missing_docs)]

pub mod action;
pub mod clock;
pub mod error;
pub mod preparation;
pub mod row;

pub use error::{PrepError, Result, ResultExt};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::{
        Action, ActionCategory, ActionContext, ActionDefinition, ActionFactory, ActionRegistry,
        ActionRuntime, ActionScript, ActionStatus, NewColumn, Parameters, Scope,
        TransformationContext,
    };
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::error::{PrepError, Result, ResultExt};
    pub use crate::preparation::{
        AppendStep, InMemoryRepository, Preparation, PreparationRepository, PreparationService,
        RepositoryExt, Step, StepChain, StepDiff, StepId,
    };
    pub use crate::row::{Column, ColumnId, ColumnType, Row, RowDiff, Schema};
}
