// src/access_log/request_line.rs
//! Splitting of HTTP request lines (e.g. `GET /index.html HTTP/1.1`).

/// The three parts of an HTTP request line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestLine<'line> {
    /// The request method, e.g. `GET`.
    pub method: &'line str,

    /// The request target, e.g. `/index.html`.
    pub url: &'line str,

    /// The protocol version, e.g. `HTTP/1.1`.
    pub version: &'line str,
}

/// A request line that did not consist of exactly three whitespace-separated parts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MalformedRequestLine {
    request_line: String,
}

impl MalformedRequestLine {
    /// The offending request line, exactly as it appeared in the log.
    #[must_use]
    pub fn request_line(&self) -> &str {
        &self.request_line
    }
}

impl std::fmt::Display for MalformedRequestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "malformed request line: {}", self.request_line)
    }
}

impl std::error::Error for MalformedRequestLine {}

impl<'line> RequestLine<'line> {
    /// Split `request_line` on runs of whitespace into method, URL, and version.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRequestLine`] if there are not exactly three parts.
    pub fn split(request_line: &'line str) -> Result<Self, MalformedRequestLine> {
        let mut parts = request_line.split_whitespace();

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(url), Some(version), None) => Ok(RequestLine {
                method,
                url,
                version,
            }),
            _ => Err(MalformedRequestLine {
                request_line: request_line.to_string(),
            }),
        }
    }
}
