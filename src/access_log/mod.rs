// src/access_log/mod.rs

//! Matching of Apache access log lines in the Combined Log Format.
//!
//! See <http://httpd.apache.org/docs/2.0/logs.html#accesslog> for the format.

pub mod request_line;

use once_cell::sync::Lazy;
use regex::Regex;

pub use request_line::{MalformedRequestLine, RequestLine};

/// The Combined Log Format grammar.
///
/// Anchored at both ends, so trailing whitespace after the user agent is not accepted.
const LINE_PATTERN: &str = r#"(?x)
    ^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)\s # client address
    (\S*)\s                              # identd
    (\S*)\s                              # HTTP user
    \[([^\]]*)\]\s                       # request time
    "([^"]*)"\s                          # request line
    ([0-9]+)\s                           # response code
    (\S*)\s                              # response size
    "([^"]*)"\s                          # referrer
    "([^"]*)"$                           # user agent
"#;

static LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(LINE_PATTERN).expect("invalid access log pattern"));

/// The raw fields of a matched access log line.
///
/// Every field borrows from the line it was matched against and is left exactly as it appeared,
/// including `status` and `size`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedFields<'line> {
    /// The client address (dotted-quad shaped, but not otherwise validated).
    pub address: &'line str,

    /// The RFC 1413 identity of the client, usually `-`.
    pub identd: &'line str,

    /// The authenticated user, usually `-`.
    pub user: &'line str,

    /// The request time, without the surrounding brackets.
    pub time: &'line str,

    /// The full request line, without the surrounding quotes.
    pub request: &'line str,

    /// The response status code.
    pub status: &'line str,

    /// The response size in bytes, or `-`.
    pub size: &'line str,

    /// The `Referer` header, without the surrounding quotes.
    pub referrer: &'line str,

    /// The `User-Agent` header, without the surrounding quotes.
    pub user_agent: &'line str,
}

/// Matches lines against the Combined Log Format grammar.
///
/// A `LineMatcher` holds no state besides the compiled grammar, which is compiled once per process
/// and shared by every `LineMatcher`.
#[derive(Clone, Debug)]
pub struct LineMatcher {
    regex: Regex,
}

impl LineMatcher {
    /// Construct a matcher for the access log grammar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: LINE_REGEX.clone(),
        }
    }

    /// Match `line` against the grammar, returning its fields if it matches.
    ///
    /// `line` should not include its line terminator. Lines that don't match (including empty and
    /// blank lines) yield `None`; it's up to the caller to decide what to do with them.
    #[must_use]
    pub fn match_line<'line>(&self, line: &'line str) -> Option<ParsedFields<'line>> {
        let captures = self.regex.captures(line)?;

        // Every group in `LINE_PATTERN` takes part in a match, so `get` never returns `None`.
        let group = |index| captures.get(index).map_or("", |m| m.as_str());

        Some(ParsedFields {
            address: group(1),
            identd: group(2),
            user: group(3),
            time: group(4),
            request: group(5),
            status: group(6),
            size: group(7),
            referrer: group(8),
            user_agent: group(9),
        })
    }
}

impl Default for LineMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::test::EXAMPLE_LINE;

    use super::{LineMatcher, ParsedFields, LINE_PATTERN};

    #[test]
    fn match_combined_line() {
        let matcher = LineMatcher::new();

        assert_eq!(
            matcher.match_line(EXAMPLE_LINE),
            Some(ParsedFields {
                address: "127.0.0.1",
                identd: "-",
                user: "frank",
                time: "10/Oct/2023:13:55:36 -0700",
                request: "GET /apache_pb.gif HTTP/1.0",
                status: "200",
                size: "2326",
                referrer: "http://www.example.com/start.html",
                user_agent: "Mozilla/5.0",
            })
        );
    }

    #[test]
    fn match_does_not_validate_address() {
        let matcher = LineMatcher::new();
        let line = r#"999.1.300.04 - - [x] "GET / HTTP/1.1" 404 - "-" "-""#;

        let fields = matcher.match_line(line).expect("expected a match");
        assert_eq!(fields.address, "999.1.300.04");
        assert_eq!(fields.size, "-");
    }

    #[test]
    fn match_keeps_malformed_request() {
        // Splitting the request is not the matcher's concern.
        let matcher = LineMatcher::new();
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 -0700] "GET /foo" 200 12 "-" "curl/7.68.0""#;

        let fields = matcher.match_line(line).expect("expected a match");
        assert_eq!(fields.request, "GET /foo");
        assert_eq!(fields.user_agent, "curl/7.68.0");
    }

    #[test]
    fn match_empty_quoted_fields() {
        let matcher = LineMatcher::new();
        let line = r#"10.0.0.1 - - [] "" 400 0 "" """#;

        let fields = matcher.match_line(line).expect("expected a match");
        assert_eq!(fields.time, "");
        assert_eq!(fields.request, "");
        assert_eq!(fields.referrer, "");
    }

    #[test]
    fn no_match() {
        let matcher = LineMatcher::new();

        for line in &[
            "",
            "   ",
            "hello?",
            // Missing the referrer and user agent (Common Log Format).
            r#"127.0.0.1 - frank [10/Oct/2023:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#,
            // Non-numeric status.
            r#"127.0.0.1 - - [x] "GET / HTTP/1.0" OK 2326 "-" "-""#,
            // Hostname instead of an address.
            r#"localhost - - [x] "GET / HTTP/1.0" 200 2326 "-" "-""#,
        ] {
            assert_eq!(matcher.match_line(line), None, "line: {:?}", line);
        }
    }

    #[test]
    fn no_match_trailing_whitespace() {
        let matcher = LineMatcher::new();

        assert_eq!(matcher.match_line(&format!("{} ", EXAMPLE_LINE)), None);
        assert_eq!(matcher.match_line(&format!("{}\n", EXAMPLE_LINE)), None);
    }

    #[test]
    fn matchers_share_compiled_grammar() {
        let first = LineMatcher::new();
        let second = LineMatcher::default();

        assert_eq!(first.regex.as_str(), LINE_PATTERN);
        assert_eq!(second.regex.as_str(), LINE_PATTERN);
        assert_eq!(first.match_line(EXAMPLE_LINE), second.match_line(EXAMPLE_LINE));
    }
}
