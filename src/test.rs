// src/test.rs
use std::io::{self, Write};

/// A convenient alias to use `?` in tests.
///
/// There is a blanket `impl From<E: Error> for Box<dyn Error>`, meaning anything that implements
/// [`std::error::Error`] can be propagated using `?`.
pub type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// The example line from the Apache documentation, with a shorter user agent.
pub const EXAMPLE_LINE: &str = r#"127.0.0.1 - frank [10/Oct/2023:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/5.0""#;

/// The tab-delimited row expected for [`EXAMPLE_LINE`].
pub const EXAMPLE_ROW: &str = "127.0.0.1\t-\tfrank\t10/Oct/2023:13:55:36 -0700\tGET\t/apache_pb.gif\tHTTP/1.0\t200\t2326\thttp://www.example.com/start.html\tMozilla/5.0";

/// The tab-delimited header row.
pub const HEADER_ROW: &str = "ip_address\tidentd\tHTTP_user\tRequest_time\tHTTP_Method\tRequest_URL\tHTTP_Version\tHTTP_ResponseCode\tHTTP_Response_Size\tHTTP_Referrer\tUser_Agent";

/// Construct an access log line for `request`, otherwise identical to [`EXAMPLE_LINE`].
#[must_use]
pub fn access_line(request: &str) -> String {
    format!(
        r#"127.0.0.1 - frank [10/Oct/2023:13:55:36 -0700] "{}" 200 2326 "http://www.example.com/start.html" "Mozilla/5.0""#,
        request
    )
}

/// A sink that fails every write.
#[derive(Debug)]
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
