//! One connection, one request: parse → dispatch → respond → log → close.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, warn};

use crate::access_log::{AccessLog, LogEntry};
use crate::handler;
use crate::request::{self, ParseError};
use crate::response::Response;
use crate::sandbox::Sandbox;
use crate::status::Status;

/// State every worker shares. Only the access log is mutable, behind its
/// own lock.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) sandbox: Sandbox,
    pub(crate) access_log: AccessLog,
}

/// Serves a single request over `io` and shuts down its write side.
///
/// Errors stay inside this connection: they are reported on the
/// operational log and the request is not access-logged.
pub(crate) async fn serve<IO>(mut io: IO, peer: SocketAddr, ctx: &Context)
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(&mut io);
    let mut reader = BufReader::new(reader);

    let (response, entry) = match request::read_request(&mut reader).await {
        Ok(Some(req)) => {
            let response = handler::handle(&req, &ctx.sandbox).await;
            let entry = LogEntry::now(peer.ip(), req.method(), req.path(), response.status_code().code());
            (response, entry)
        }
        Ok(None) => {
            debug!(peer = %peer, "connection closed without a request");
            return;
        }
        Err(e @ ParseError::MalformedRequestLine) => {
            let response = Response::error_page(Status::BadRequest, &e.to_string());
            (response, LogEntry::malformed(peer.ip(), Status::BadRequest.code()))
        }
        Err(ParseError::Io(e)) => {
            warn!(peer = %peer, "failed to read request: {e}");
            return;
        }
    };

    if let Err(e) = response.write_to(&mut writer).await {
        error!(peer = %peer, "failed to write response: {e}");
        return;
    }
    if let Err(e) = writer.shutdown().await {
        debug!(peer = %peer, "shutdown after response failed: {e}");
    }

    ctx.access_log.append(&entry).await;
}
