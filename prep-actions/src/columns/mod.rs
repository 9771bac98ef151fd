//! Column actions.

mod copy;
mod delete;
mod rename;

pub use copy::CopyColumn;
pub use delete::DeleteColumn;
pub use rename::{NEW_COLUMN_NAME, RenameColumn};
