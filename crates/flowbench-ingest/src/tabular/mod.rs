//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::{parse_csv, synthesized_column_name};
pub use writer::write_csv;
