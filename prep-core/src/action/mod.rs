//! Action contract and runtime.
//!
//! - [`ActionDefinition`]: what a concrete action implements
//! - [`ActionFactory`]: scope validation, produces [`ActionRuntime`]s
//! - [`ActionContext`]: per-execution state of one action
//! - [`ActionRegistry`]: name to definition lookup
//! - [`ActionScript`]: the JSON wire format of an action list

mod context;
mod definition;
mod parameters;
mod registry;
mod runtime;
mod scope;
mod script;

pub use context::{ActionContext, ActionStatus, NewColumn, TransformationContext};
pub use definition::{ActionCategory, ActionDefinition};
pub use parameters::{Parameters, keys};
pub use registry::{ActionInfo, ActionRegistry};
pub use runtime::{ActionFactory, ActionRuntime};
pub use scope::Scope;
pub use script::{Action, ActionScript};
