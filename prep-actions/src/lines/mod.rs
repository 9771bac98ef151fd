//! Line actions.

mod delete_line;
mod make_header;

pub use delete_line::DeleteSingleLine;
pub use make_header::MakeLineHeader;
