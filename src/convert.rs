// src/convert.rs
//! The line-by-line conversion of an access log into rows.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use log::{trace, warn};

use crate::access_log::{LineMatcher, RequestLine};
use crate::config::Options;
use crate::interrupt::Interrupt;
use crate::row_writer::{OutputRow, RowWriter, WriteError};

/// Counts of what happened to the lines of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// The number of lines read from the input.
    pub lines_read: u64,

    /// The number of data rows written (excluding the header).
    pub rows_written: u64,

    /// The number of lines that did not match the access log format.
    pub unmatched_lines: u64,

    /// The number of lines skipped because their request line didn't have three parts.
    pub malformed_request_lines: u64,

    /// Whether the run was stopped early by an interrupt.
    pub interrupted: bool,
}

/// Possible error situations when converting.
#[derive(Debug)]
pub enum ConvertError {
    /// Reading from the input failed.
    Read(io::Error),

    /// Writing to the output failed.
    Write(WriteError),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConvertError::Read(error) => write!(f, "error reading input: {}", error),
            ConvertError::Write(error) => write!(f, "error writing output: {}", error),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Read(error) => Some(error),
            ConvertError::Write(error) => Some(error),
        }
    }
}

/// Convert every line of `input` into a row of `output`.
///
/// - Lines that don't match the access log format are skipped without comment.
/// - Lines whose request line doesn't split into method, URL, and version are skipped, and a
///   `Skipping request line ...` message is written to `diagnostics`.
/// - If `interrupt` is raised, conversion stops before the next line.
///
/// `output` is closed before returning, whether or not conversion succeeded.
///
/// # Errors
///
/// Any failure to read `input` or write `output` stops the conversion and is returned. Rows that
/// were already written are left in `output`.
pub fn convert<R, W, D>(
    mut input: R,
    output: W,
    mut diagnostics: D,
    options: &Options,
    interrupt: &Interrupt,
) -> Result<Summary, ConvertError>
where
    R: BufRead,
    W: Write,
    D: Write,
{
    let mut writer = RowWriter::open(output, options.delimiter);

    let result = Converter {
        matcher: LineMatcher::new(),
        writer: &mut writer,
        diagnostics: &mut diagnostics,
        summary: Summary::default(),
    }
    .run(&mut input, options, interrupt);
    let closed = writer.close().map_err(ConvertError::Write);

    let summary = result?;
    closed?;
    Ok(summary)
}

struct Converter<'run, W: Write, D: Write> {
    matcher: LineMatcher,
    writer: &'run mut RowWriter<W>,
    diagnostics: &'run mut D,
    summary: Summary,
}

impl<W: Write, D: Write> Converter<'_, W, D> {
    fn run<R: BufRead>(
        mut self,
        input: &mut R,
        options: &Options,
        interrupt: &Interrupt,
    ) -> Result<Summary, ConvertError> {
        if options.write_header_row {
            let _writing = interrupt.begin_write();
            self.writer.write_header().map_err(ConvertError::Write)?;
        }

        let mut buf = Vec::new();
        loop {
            if interrupt.is_raised() {
                warn!(
                    "Interrupted after {} lines, stopping",
                    self.summary.lines_read
                );
                self.summary.interrupted = true;
                break;
            }

            buf.clear();
            if input.read_until(b'\n', &mut buf).map_err(ConvertError::Read)? == 0 {
                break;
            }
            self.summary.lines_read += 1;

            let line = decode_line(&buf);
            self.convert_line(&line, interrupt)?;
        }

        self.summary.rows_written = self.writer.rows_written();
        Ok(self.summary)
    }

    fn convert_line(&mut self, line: &str, interrupt: &Interrupt) -> Result<(), ConvertError> {
        let fields = match self.matcher.match_line(line) {
            Some(fields) => fields,
            None => {
                trace!("Skipping unmatched line {}", self.summary.lines_read);
                self.summary.unmatched_lines += 1;
                return Ok(());
            }
        };

        let request = match RequestLine::split(fields.request) {
            Ok(request) => request,
            Err(error) => {
                self.summary.malformed_request_lines += 1;
                if let Err(diagnostic_error) =
                    writeln!(self.diagnostics, "Skipping request line {}", error.request_line())
                {
                    warn!("Failed to write diagnostic: {}", diagnostic_error);
                }
                return Ok(());
            }
        };

        let _writing = interrupt.begin_write();
        self.writer
            .write_row(&OutputRow::new(&fields, &request))
            .map_err(ConvertError::Write)
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode the line, replacing invalid UTF-8.
fn decode_line(buf: &[u8]) -> Cow<'_, str> {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
