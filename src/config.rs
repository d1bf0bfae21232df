// src/config.rs
//! Configuration for a conversion run.

use std::path::PathBuf;

use crate::row_writer::DEFAULT_DELIMITER;

/// Configuration for [`run`](crate::run).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// The access log to read.
    ///
    /// Standard input is read if this is `None` or `-`.
    pub input: Option<PathBuf>,

    /// Where to write the output.
    ///
    /// Standard output is written if this is `None`. If this is an existing directory, the output
    /// is written to a `.csv` file in that directory named after the input file.
    pub output: Option<PathBuf>,

    /// Options controlling the output format.
    pub options: Options,
}

/// Options controlling the output format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Whether to write the header row before any data rows.
    pub write_header_row: bool,

    /// The byte used to separate fields.
    pub delimiter: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            write_header_row: true,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Parse a delimiter argument.
///
/// The delimiter must be a single byte. The escape `\t` is also accepted for a tab, since a literal
/// tab is awkward to pass on the command line.
///
/// # Errors
///
/// Returns a message suitable for the command line if `input` is not a single byte.
pub fn parse_delimiter(input: &str) -> Result<u8, String> {
    match input.as_bytes() {
        [byte] => Ok(*byte),
        b"\\t" => Ok(b'\t'),
        _ => Err(format!(
            "delimiter must be a single byte, got {:?}",
            input
        )),
    }
}
