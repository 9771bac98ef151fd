//! Built-in actions of the prep transformation engine.
//!
//! ## Text (`text::*`)
//! - [`text::Uppercase`], [`text::Lowercase`] - case changes
//! - [`text::Trim`] - whitespace trimming
//! - [`text::ReplaceOnValue`] - regular expression replacement
//!
//! ## Data cleansing (`cleansing::*`)
//! - [`cleansing::FillEmptyWithValue`] - constant for blank cells
//! - [`cleansing::DeleteEmptyRows`] - deletes blank rows
//!
//! ## Columns (`columns::*`)
//! - [`columns::CopyColumn`] - duplicates a column
//! - [`columns::RenameColumn`] - renames a column
//! - [`columns::DeleteColumn`] - removes a column
//!
//! ## Lines (`lines::*`)
//! - [`lines::DeleteSingleLine`] - deletes one row
//! - [`lines::MakeLineHeader`] - promotes a row to header
//!
//! Every action is listed once in a static table; [`standard_registry`]
//! builds an [`ActionRegistry`] from it.

#![warn(missing_docs)]

pub mod cleansing;
pub mod columns;
pub mod lines;
mod support;
pub mod text;

use prep_core::action::{ActionDefinition, ActionRegistry};
use std::sync::Arc;

pub use cleansing::{DeleteEmptyRows, FillEmptyWithValue};
pub use columns::{CopyColumn, DeleteColumn, RenameColumn};
pub use lines::{DeleteSingleLine, MakeLineHeader};
pub use text::{Lowercase, ReplaceOnValue, Trim, Uppercase};

type Constructor = fn() -> Arc<dyn ActionDefinition>;

static STANDARD_ACTIONS: &[Constructor] = &[
    || Arc::new(Uppercase),
    || Arc::new(Lowercase),
    || Arc::new(Trim),
    || Arc::new(ReplaceOnValue),
    || Arc::new(FillEmptyWithValue),
    || Arc::new(DeleteEmptyRows),
    || Arc::new(CopyColumn),
    || Arc::new(RenameColumn),
    || Arc::new(DeleteColumn),
    || Arc::new(DeleteSingleLine),
    || Arc::new(MakeLineHeader),
];

/// Registry holding every built-in action.
pub fn standard_registry() -> ActionRegistry {
    let registry = STANDARD_ACTIONS
        .iter()
        .fold(ActionRegistry::new(), |registry, create| registry.with(create()));
    tracing::debug!(actions = registry.len(), "Built standard action registry");
    registry
}
