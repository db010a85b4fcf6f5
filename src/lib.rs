//! # wicket
//!
//! A small concurrent HTTP/1.1 server for a directory of static files.
//! One request per connection, no keep-alive, no TLS.
//!
//! ## What it does
//!
//! - `GET` serves files from a sandboxed content root; `/` maps to the index
//!   document and any path that would escape the root is answered with `403`.
//! - `POST /echo` echoes the HTML-escaped body back; `POST` anywhere else
//!   acknowledges it the same way.
//! - Every other method gets `405`, a malformed request line gets `400`.
//! - Every completed request appends one line to an access log.
//!
//! ## How it runs
//!
//! A single accept loop feeds a fixed-size [`WorkerPool`] through a bounded
//! queue. Each worker handles one connection end to end, parse → dispatch →
//! respond → log → close, and the only state workers share is the
//! [`AccessLog`], whose appends are serialized.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wicket::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wicket::Error> {
//!     let config = ServerConfig { port: 3000, ..ServerConfig::default() };
//!     Server::bind(config).await?.serve().await
//! }
//! ```

mod connection;
mod error;
mod method;
mod request;
mod response;
mod sandbox;
mod server;
mod status;

pub mod access_log;
pub mod config;
pub mod handler;
pub mod pool;

pub use access_log::{AccessLog, LogEntry};
pub use config::{Cli, ServerConfig};
pub use error::Error;
pub use method::Method;
pub use pool::WorkerPool;
pub use request::{ParseError, Request, read_request};
pub use response::{ContentType, Response};
pub use sandbox::{Forbidden, Sandbox};
pub use server::Server;
pub use status::Status;
