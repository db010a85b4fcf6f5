//! Incoming HTTP request type and the wire parser that builds it.
//!
//! One request per connection: a request line, a header block terminated by
//! an empty line, and an optional body whose size is given by
//! `content-length`. Chunked bodies and multi-value headers are not
//! supported; a repeated header keeps its last value.

use std::collections::HashMap;
use std::fmt;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// An incoming HTTP request, parsed from the raw TCP stream.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) version: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    pub(crate) fn new(
        method: String,
        path: String,
        version: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, version, headers, body }
    }

    /// The method token exactly as the client sent it.
    pub fn method(&self) -> &str { &self.method }
    /// The raw request target, query string included.
    pub fn path(&self) -> &str { &self.path }
    pub fn version(&self) -> &str { &self.version }
    /// Headers keyed by lowercased name.
    pub fn headers(&self) -> &HashMap<String, String> { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Why a request could not be parsed.
#[derive(Debug)]
pub enum ParseError {
    /// The request line did not have method, path and version.
    MalformedRequestLine,
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRequestLine => f.write_str("Malformed request line"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedRequestLine => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Reads one request from `reader`.
///
/// Returns `Ok(None)` when the client sent nothing (closed the connection
/// or sent an empty first line); no response is owed in that case.
///
/// A body shorter than its declared `content-length` is accepted as-is when
/// the stream ends early.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<Request>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = match read_line(reader).await? {
        Some(line) if !line.is_empty() => line,
        _ => return Ok(None),
    };

    let mut tokens: Vec<&str> = request_line.split(' ').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    let [method, path, version, ..] = tokens[..] else {
        return Err(ParseError::MalformedRequestLine);
    };
    let (method, path, version) = (method.to_owned(), path.to_owned(), version.to_owned());

    let mut headers = HashMap::new();
    while let Some(line) = read_line(reader).await? {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                headers.insert(name.to_ascii_lowercase(), value.trim().to_owned());
            }
        }
    }

    let declared = headers
        .get("content-length")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let mut body = Vec::new();
    if declared > 0 {
        reader.take(declared).read_to_end(&mut body).await?;
    }

    Ok(Some(Request::new(method, path, version, headers, body)))
}

/// Reads one CRLF- or LF-terminated line, without its terminator.
/// `None` means the stream was already at EOF.
async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(raw: &[u8]) -> Result<Option<Request>, ParseError> {
        let mut reader = raw;
        read_request(&mut reader).await
    }

    #[tokio::test]
    async fn parses_request_line_and_headers() {
        let req = parse(b"GET /index.html?x=1 HTTP/1.1\r\nHost: example.com\r\nX-Thing:  a b \r\n\r\n")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/index.html?x=1");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.header("host"), Some("example.com"));
        assert_eq!(req.header("X-THING"), Some("a b"));
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn accepts_bare_lf_line_endings() {
        let req = parse(b"POST /echo HTTP/1.0\nContent-Length: 2\n\nhi").await.unwrap().unwrap();
        assert_eq!(req.method(), "POST");
        assert_eq!(req.body(), b"hi");
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        assert!(parse(b"").await.unwrap().is_none());
        assert!(parse(b"\r\n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_request_line_is_malformed() {
        assert!(matches!(parse(b"GET\r\n\r\n").await, Err(ParseError::MalformedRequestLine)));
        assert!(matches!(parse(b"GET /\r\n\r\n").await, Err(ParseError::MalformedRequestLine)));
        assert!(matches!(parse(b"GET / \r\n\r\n").await, Err(ParseError::MalformedRequestLine)));
    }

    #[tokio::test]
    async fn extra_request_line_tokens_are_ignored() {
        let req = parse(b"GET / HTTP/1.1 trailing\r\n\r\n").await.unwrap().unwrap();
        assert_eq!(req.version(), "HTTP/1.1");
    }

    #[tokio::test]
    async fn duplicate_headers_keep_last_value() {
        let req = parse(b"GET / HTTP/1.1\r\nAccept: a\r\naccept: b\r\n\r\n").await.unwrap().unwrap();
        assert_eq!(req.header("accept"), Some("b"));
        assert_eq!(req.headers().len(), 1);
    }

    #[tokio::test]
    async fn header_lines_without_name_are_skipped() {
        let req = parse(b"GET / HTTP/1.1\r\n: orphan\r\nno-colon-here\r\nA: 1\r\n\r\n").await.unwrap().unwrap();
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("a"), Some("1"));
    }

    #[tokio::test]
    async fn body_is_read_to_declared_length() {
        let req = parse(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello world").await.unwrap().unwrap();
        assert_eq!(req.body(), b"hello");
    }

    #[tokio::test]
    async fn short_body_is_tolerated() {
        let req = parse(b"POST /echo HTTP/1.1\r\nContent-Length: 50\r\n\r\nabc").await.unwrap().unwrap();
        assert_eq!(req.body(), b"abc");
    }

    #[tokio::test]
    async fn unparseable_content_length_means_no_body() {
        let req = parse(b"POST /echo HTTP/1.1\r\nContent-Length: -3\r\n\r\nabc").await.unwrap().unwrap();
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn headers_end_at_eof() {
        let req = parse(b"GET / HTTP/1.1\r\nHost: x").await.unwrap().unwrap();
        assert_eq!(req.header("host"), Some("x"));
    }
}
