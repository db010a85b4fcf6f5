//! Outgoing HTTP response type and its wire serialization.
//!
//! Every response is written as a complete HTTP/1.1 message with an exact
//! `Content-Length` and `Connection: close`; the connection is never reused.
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Fri, 16 Oct 2026 09:30:00 GMT\r\n
//! Server: wicket/0.1.0\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Content-Length: 42\r\n
//! Connection: close\r\n
//! \r\n
//! <body bytes>
//! ```
//!
//! A status-only response carries just `Content-Length: 0` and
//! `Connection: close`.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::status::Status;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values the server produces itself. File responses carry
/// whatever type was guessed for the file.
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    OctetStream,  // application/octet-stream
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use wicket::{ContentType, Response, Status};
///
/// Response::html(Status::NotFound, "<h2>gone</h2>");
/// Response::bytes(Status::Ok, "image/png", vec![0x89, b'P', b'N', b'G']);
/// Response::status(Status::MethodNotAllowed);
/// # let _ = ContentType::Html;
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) status: Status,
    pub(crate) content_type: Option<String>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    /// HTML body (`text/html; charset=utf-8`).
    pub fn html(status: Status, body: impl Into<Vec<u8>>) -> Self {
        Self::bytes(status, ContentType::Html.as_str(), body)
    }

    /// Arbitrary body with an explicit content type.
    pub fn bytes(status: Status, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, content_type: Some(content_type.into()), body: body.into() }
    }

    /// Response with no body and none of the descriptive headers.
    pub fn status(status: Status) -> Self {
        Self { status, content_type: None, body: Vec::new() }
    }

    /// The canned error page: `<h2>{code} {phrase}</h2><p>{message}</p>`.
    pub fn error_page(status: Status, message: &str) -> Self {
        let body = format!(
            "<html><body><h2>{} {}</h2><p>{message}</p></body></html>",
            status.code(),
            status.reason_phrase(),
        );
        Self::html(status, body)
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Serializes the status line and header block.
    fn head(&self) -> String {
        let fields = match &self.content_type {
            Some(content_type) => format!(
                "Date: {}\r\nServer: {SERVER_NAME}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n",
                http_date(),
                self.body.len(),
            ),
            None => "Content-Length: 0\r\n".to_owned(),
        };
        format!(
            "HTTP/1.1 {} {}\r\n{fields}Connection: close\r\n\r\n",
            self.status.code(),
            self.status.reason_phrase(),
        )
    }

    /// Writes the full response and flushes `writer`.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.head().as_bytes()).await?;
        if self.content_type.is_some() {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}

/// Current time in the RFC 1123 format HTTP uses for `Date`.
fn http_date() -> String {
    chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
