//! HTTP status codes as a typed enum.
//!
//! Only the codes the server actually sends are listed. Each one carries its
//! numeric code and reason phrase:
//!
//! ```rust
//! use wicket::Status;
//!
//! assert_eq!(u16::from(Status::Forbidden), 403);
//! assert_eq!(Status::Forbidden.reason_phrase(), "Forbidden");
//! ```

/// A status code the server can answer with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Forbidden,           // 403
    NotFound,            // 404
    MethodNotAllowed,    // 405

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl Status {
    /// The numeric status code.
    pub fn code(self) -> u16 {
        self.into()
    }

    /// The reason phrase written on the status line.
    pub fn reason_phrase(self) -> &'static str {
        match self {
            Self::Ok                  => "OK",
            Self::BadRequest          => "Bad Request",
            Self::Forbidden           => "Forbidden",
            Self::NotFound            => "Not Found",
            Self::MethodNotAllowed    => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::BadRequest          => 400,
            Status::Forbidden           => 403,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}
