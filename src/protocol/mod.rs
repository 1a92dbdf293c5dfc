//! Wire protocol
//!
//! Defines the JSON records exchanged with clients and their parsing.

pub mod parser;
pub mod records;

pub use parser::{MAX_RECORD_LENGTH, parse_record};
pub use records::{ClientRecord, ServerRecord};
