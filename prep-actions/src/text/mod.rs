//! Text actions.

mod case;
mod replace;
mod trim;

pub use case::{Lowercase, Uppercase};
pub use replace::{CELL_VALUE, REPLACE_ENTIRE_CELL, REPLACE_VALUE, ReplaceOnValue};
pub use trim::Trim;
