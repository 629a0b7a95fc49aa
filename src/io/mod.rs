//! I/O module
//!
//! Handles actor-script parsing and CSV output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `script_reader` - Asynchronous actor-script reader with batch interface

pub mod csv_format;
pub mod script_reader;

pub use csv_format::{convert_script_record, write_accounts_csv, write_reports_csv, ScriptRecord};
pub use script_reader::{read_script, ScriptReader};
