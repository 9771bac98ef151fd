//! Data cleansing actions.

mod delete_empty;
mod fill_empty;

pub use delete_empty::DeleteEmptyRows;
pub use fill_empty::{FillEmptyWithValue, VALUE};
