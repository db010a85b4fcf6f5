//! Request dispatch.
//!
//! | Method | Path | Result |
//! |---|---|---|
//! | `GET` | escapes the root | `403`, status-only |
//! | `GET` | regular file | `200`, file bytes, guessed content type |
//! | `GET` | anything else | `404`, HTML page |
//! | `POST` | `/echo` (any case) | `200`, HTML page echoing the escaped body |
//! | `POST` | anything else | `200`, HTML page acknowledging the escaped body |
//! | other | any | `405`, status-only |
//!
//! Method matching ignores ASCII case.

use std::io;
use std::path::Path;

use tracing::{error, warn};

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::sandbox::Sandbox;
use crate::status::Status;

const NOT_FOUND_PAGE: &str =
    "<html><body><h2>404 Not Found</h2><p>Resource not found.</p></body></html>";

/// Maps one parsed request to the response that should be sent for it.
pub async fn handle(req: &Request, sandbox: &Sandbox) -> Response {
    match Method::from_token(req.method()) {
        Some(Method::Get) => get(req.path(), sandbox).await,
        Some(Method::Post) => post(req.path(), req.body()),
        _ => Response::status(Status::MethodNotAllowed),
    }
}

async fn get(raw_path: &str, sandbox: &Sandbox) -> Response {
    let Ok(path) = sandbox.resolve(raw_path) else {
        warn!(path = raw_path, "request path escapes the content root");
        return Response::status(Status::Forbidden);
    };

    // Symlinks may point anywhere; follow them and re-check containment.
    let real = match tokio::fs::canonicalize(&path).await {
        Ok(real) => real,
        Err(_) => return not_found(),
    };
    if !sandbox.contains(&real) {
        warn!(path = raw_path, target = %real.display(), "symlink escapes the content root");
        return Response::status(Status::Forbidden);
    }

    match tokio::fs::metadata(&real).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }

    file_response(&real, tokio::fs::read(&real).await)
}

/// Turns the outcome of reading a resolved file into a response.
fn file_response(path: &Path, contents: io::Result<Vec<u8>>) -> Response {
    match contents {
        Ok(contents) => {
            let content_type = mime_guess::from_path(path).first_or_octet_stream();
            Response::bytes(Status::Ok, content_type.to_string(), contents)
        }
        Err(e) => {
            error!(file = %path.display(), "failed to read file: {e}");
            Response::status(Status::InternalServerError)
        }
    }
}

fn post(raw_path: &str, body: &[u8]) -> Response {
    let escaped = escape_html(body);
    let mut page = Vec::with_capacity(escaped.len() + 96);
    if raw_path.eq_ignore_ascii_case("/echo") {
        page.extend_from_slice(b"<html><body><h2>POST Echo</h2><pre>");
        page.extend_from_slice(&escaped);
        page.extend_from_slice(b"</pre><p><a href=\"/\">Back</a></p></body></html>");
    } else {
        page.extend_from_slice(b"<html><body><h2>Received POST</h2><pre>");
        page.extend_from_slice(&escaped);
        page.extend_from_slice(b"</pre></body></html>");
    }
    Response::html(Status::Ok, page)
}

fn not_found() -> Response {
    Response::html(Status::NotFound, NOT_FOUND_PAGE)
}

/// Escapes `&`, `<` and `>`. Every other byte passes through untouched, so
/// bodies that are not valid UTF-8 survive intact.
pub fn escape_html(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &b in input {
        match b {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            _ => out.push(b),
        }
    }
    out
}
