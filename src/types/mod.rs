//! Core value, row and result table types.

mod table;
mod value;

pub use table::ResultTable;
pub use value::{parse_date, parse_number, DataType, Row, Value};
