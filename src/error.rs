//! Unified error type.

use std::fmt;

/// The error type returned by wicket's fallible operations.
///
/// Client-facing failures (400, 403, 404, 405) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: preparing the content root, binding the port,
/// accepting a connection, or handing work to a stopped worker pool.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    PoolClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::PoolClosed => f.write_str("worker pool is shut down"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::PoolClosed => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
