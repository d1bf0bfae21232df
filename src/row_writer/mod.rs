// src/row_writer/mod.rs

//! Writing converted access log entries as rows of delimited text.

use std::io::{self, Write};

use log::{trace, warn};

use crate::access_log::{ParsedFields, RequestLine};

/// The number of columns in every row.
pub const COLUMN_COUNT: usize = 11;

/// The names of the columns, in the order they are written.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "ip_address",
    "identd",
    "HTTP_user",
    "Request_time",
    "HTTP_Method",
    "Request_URL",
    "HTTP_Version",
    "HTTP_ResponseCode",
    "HTTP_Response_Size",
    "HTTP_Referrer",
    "User_Agent",
];

/// The default column delimiter.
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// A single row of output, with the request line split into its parts.
///
/// The fields are in the same order as [`HEADER`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputRow<'line> {
    fields: [&'line str; COLUMN_COUNT],
}

impl<'line> OutputRow<'line> {
    /// Construct a row from the fields of a matched line and its split request line.
    #[must_use]
    pub fn new(fields: &ParsedFields<'line>, request: &RequestLine<'line>) -> Self {
        Self {
            fields: [
                fields.address,
                fields.identd,
                fields.user,
                fields.time,
                request.method,
                request.url,
                request.version,
                fields.status,
                fields.size,
                fields.referrer,
                fields.user_agent,
            ],
        }
    }

    /// The fields of the row, in column order.
    #[must_use]
    pub fn fields(&self) -> &[&'line str; COLUMN_COUNT] {
        &self.fields
    }
}

/// Possible error situations when writing rows.
#[derive(Debug)]
pub enum WriteError {
    /// The writer has already been closed.
    SinkClosed,

    /// A header was written after another header, or after a data row.
    HeaderOutOfOrder,

    /// The row could not be written to the underlying sink.
    Csv(csv::Error),

    /// The underlying sink could not be flushed.
    Io(io::Error),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WriteError::SinkClosed => write!(f, "output has already been closed"),
            WriteError::HeaderOutOfOrder => {
                write!(f, "header row must be written once, before any data rows")
            }
            WriteError::Csv(error) => write!(f, "{}", error),
            WriteError::Io(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::SinkClosed | WriteError::HeaderOutOfOrder => None,
            WriteError::Csv(error) => Some(error),
            WriteError::Io(error) => Some(error),
        }
    }
}

impl From<csv::Error> for WriteError {
    fn from(error: csv::Error) -> Self {
        WriteError::Csv(error)
    }
}

impl From<io::Error> for WriteError {
    fn from(error: io::Error) -> Self {
        WriteError::Io(error)
    }
}

#[derive(Debug)]
enum State<W: Write> {
    Open(csv::Writer<W>),
    Closed,
}

/// Writes rows of delimited text to a sink.
///
/// Constructing a `RowWriter` opens it. Every call to [`write_header`](Self::write_header) or
/// [`write_row`](Self::write_row) writes and flushes exactly one line, so nothing is held back
/// between calls. Once [`close`](Self::close)d, further writes fail with
/// [`WriteError::SinkClosed`]. A writer that is dropped without being closed is flushed on drop.
#[derive(Debug)]
pub struct RowWriter<W: Write> {
    state: State<W>,
    header_allowed: bool,
    rows_written: u64,
}

impl<W: Write> RowWriter<W> {
    /// Open a writer over `sink`, separating fields with `delimiter`.
    ///
    /// Fields containing the delimiter, a quote, or a line break are quoted, with embedded quotes
    /// doubled.
    #[must_use]
    pub fn open(sink: W, delimiter: u8) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(sink);

        Self {
            state: State::Open(writer),
            header_allowed: true,
            rows_written: 0,
        }
    }

    /// Write the [`HEADER`] row.
    ///
    /// # Errors
    ///
    /// - If the writer has been closed, [`WriteError::SinkClosed`] is returned.
    /// - If a header or any data row has already been written, [`WriteError::HeaderOutOfOrder`]
    ///   is returned.
    /// - Any errors from the underlying sink are propagated.
    pub fn write_header(&mut self) -> Result<(), WriteError> {
        let writer = Self::writer(&mut self.state)?;
        if !self.header_allowed {
            return Err(WriteError::HeaderOutOfOrder);
        }
        Self::write_line(writer, &HEADER)?;
        self.header_allowed = false;
        Ok(())
    }

    /// Write a single data row.
    ///
    /// # Errors
    ///
    /// - If the writer has been closed, [`WriteError::SinkClosed`] is returned.
    /// - Any errors from the underlying sink are propagated.
    pub fn write_row(&mut self, row: &OutputRow<'_>) -> Result<(), WriteError> {
        let writer = Self::writer(&mut self.state)?;
        Self::write_line(writer, row.fields())?;
        self.header_allowed = false;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and close the writer.
    ///
    /// Closing an already closed writer does nothing.
    ///
    /// # Errors
    ///
    /// Propagates any error from flushing the underlying sink. The writer is closed regardless.
    pub fn close(&mut self) -> Result<(), WriteError> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(mut writer) => {
                trace!("Closing output after {} rows", self.rows_written);
                writer.flush()?;
                Ok(())
            }
            State::Closed => Ok(()),
        }
    }

    /// The number of data rows written so far.
    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn writer(state: &mut State<W>) -> Result<&mut csv::Writer<W>, WriteError> {
        match state {
            State::Open(writer) => Ok(writer),
            State::Closed => Err(WriteError::SinkClosed),
        }
    }

    fn write_line(writer: &mut csv::Writer<W>, fields: &[&str]) -> Result<(), WriteError> {
        writer.write_record(fields)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for RowWriter<W> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!("Failed to flush output on drop: {}", error);
        }
    }
}
