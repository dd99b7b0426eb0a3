//! Local preview server for the `test` command.
//!
//! A small HTTP server over the generated `public/` directory, built on
//! `tiny_http`:
//!
//! - Static file serving with content-type guessing
//! - Automatic `index.html` resolution for directories
//! - Graceful shutdown on Ctrl+C

use crate::config::Site;
use crate::log;
use anyhow::{Context, Result};
use std::{
    fs,
    net::SocketAddr,
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server};

/// Fixed preview address; this server is for local checking only
const DEFAULT_HOST: [u8; 4] = [127, 0, 0, 1];
const DEFAULT_PORT: u16 = 9090;

/// Serve the site's `public/` directory, blocking until Ctrl+C.
pub fn serve_site(site: &Site) -> Result<()> {
    let addr = SocketAddr::from((DEFAULT_HOST, DEFAULT_PORT));
    let server = Server::http(addr)
        .map_err(|err| anyhow::anyhow!("Failed to bind {addr}: {err}"))?;
    let server = Arc::new(server);

    // Ctrl+C unblocks the accept loop below
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    let serve_root = site.website_path();
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &serve_root) {
            log!("serve"; "request error: {err}");
        }
    }

    Ok(())
}

/// Handle a single HTTP request.
///
/// Resolution order: exact file, directory `index.html`, then 404.
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    // Decode URL-encoded characters and strip any query string
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');
    let local_path = serve_root.join(request_path);

    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    serve_not_found(request)
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(404)
        .with_header(Header::from_bytes("Content-Type", "text/plain").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}
