// lib.rs

//! The elements that drive the `log2csv` binary.
//!
//! Lines of an Apache access log (in the Combined Log Format) are matched by
//! [`access_log::LineMatcher`], their request lines are split by [`access_log::RequestLine`], and
//! the resulting rows are written by [`row_writer::RowWriter`]. [`run`] ties these together for a
//! [`Config`].

#![warn(
    explicit_outlives_requirements,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_crate_level_docs,
    missing_docs,
    private_doc_tests,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_lifetimes,
    variant_size_differences,
    clippy::cargo,
    clippy::pedantic
)]

pub mod access_log;
pub mod config;
pub mod convert;
pub mod interrupt;
pub mod row_writer;
pub mod streams;

#[cfg(test)]
pub mod test;

use std::io;

use log::info;

pub use config::{Config, Options};
pub use convert::Summary;
pub use interrupt::Interrupt;

use convert::ConvertError;
use row_writer::WriteError;
use streams::{Input, InputError, Output, OutputError};

/// Possible error situations when running a conversion.
///
/// All of these are fatal to the run. Lines that can't be converted are skipped rather than
/// reported as errors.
#[derive(Debug)]
pub enum Error {
    /// The input could not be opened.
    Input(InputError),

    /// Reading from the input failed part way through.
    Read {
        /// The input being read.
        input: Input,

        /// The underlying error.
        source: io::Error,
    },

    /// The output could not be resolved or opened.
    Output(OutputError),

    /// Writing to the output failed.
    Write(WriteError),
}

impl Error {
    /// The process exit status that should be used for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Input(_) | Error::Read { .. } => 1,
            Error::Output(_) | Error::Write(_) => 2,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Input(error) => write!(f, "{}", error),
            Error::Read { input, .. } => write!(f, "Could not read from file {}", input),
            Error::Output(error) => write!(f, "{}", error),
            Error::Write(error) => write!(f, "Could not write output: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Input(error) => Some(error),
            Error::Read { source, .. } => Some(source),
            Error::Output(error) => Some(error),
            Error::Write(error) => Some(error),
        }
    }
}

impl From<InputError> for Error {
    fn from(error: InputError) -> Self {
        Error::Input(error)
    }
}

impl From<OutputError> for Error {
    fn from(error: OutputError) -> Self {
        Error::Output(error)
    }
}

/// Convert the access log described by `config`, writing diagnostics to standard error.
///
/// The input is opened before the output is created, so a missing input never leaves an empty
/// output file behind.
///
/// # Errors
///
/// See [`Error`] for the possible failures.
pub fn run(config: &Config, interrupt: &Interrupt) -> Result<Summary, Error> {
    let input = Input::from_path(config.input.as_deref());
    let reader = input.open()?;

    let output = Output::resolve(config.output.as_deref(), &input)?;
    let writer = output.open()?;

    let summary = convert::convert(
        reader,
        writer,
        io::stderr(),
        &config.options,
        interrupt,
    )
    .map_err(|error| match error {
        ConvertError::Read(source) => Error::Read {
            input: input.clone(),
            source,
        },
        ConvertError::Write(error) => Error::Write(error),
    })?;

    info!(
        "Converted {}: {} lines read, {} rows written, {} unmatched lines, {} malformed request lines",
        input,
        summary.lines_read,
        summary.rows_written,
        summary.unmatched_lines,
        summary.malformed_request_lines
    );

    Ok(summary)
}
