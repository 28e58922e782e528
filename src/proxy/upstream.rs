//! Upstream connection and request forwarding
//!
//! Opens the connection to the origin named by a request and writes a freshly
//! synthesized HTTP/1.0 request to it. Client headers other than `Host` are
//! not forwarded.

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::request::ParsedRequest;

/// Identity sent to every origin.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Connects to the origin at `request.host:request.port`.
///
/// Resolution failures, refusals and unreachable hosts all surface as an
/// error; the caller answers 502 and does not retry.
pub async fn connect(request: &ParsedRequest) -> Result<TcpStream> {
    let addr = request.authority();
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("Failed to connect to {}", addr))?;

    tracing::trace!(upstream = %addr, "Connected to upstream");
    Ok(stream)
}

/// Builds the request line and minimal header set sent upstream.
pub fn build_http_request(request: &ParsedRequest) -> Vec<u8> {
    let mut buffer = Vec::new();

    buffer.extend_from_slice(format!("GET {} HTTP/1.0\r\n", request.path).as_bytes());
    buffer.extend_from_slice(format!("Host: {}\r\n", request.host_header()).as_bytes());
    buffer.extend_from_slice(format!("User-Agent: {}\r\n", USER_AGENT).as_bytes());
    buffer.extend_from_slice(b"Connection: close\r\n");
    buffer.extend_from_slice(b"Proxy-Connection: close\r\n");
    buffer.extend_from_slice(b"\r\n");

    buffer
}

/// Writes the synthesized request to the origin.
pub async fn send_request(stream: &mut TcpStream, request: &ParsedRequest) -> Result<()> {
    let request_bytes = build_http_request(request);
    stream
        .write_all(&request_bytes)
        .await
        .context("Failed to send request upstream")?;
    stream.flush().await?;

    tracing::trace!("Request sent to upstream");
    Ok(())
}
