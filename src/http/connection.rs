use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::cache::{CacheKey, ObjectCache};
use crate::http::parser::{parse_request, ParseError};
use crate::http::request::{find_host_header, method_token, Method, ParsedRequest};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::proxy::{relay, upstream, RelayBuffer};

/// Longest request or header line read in one go; longer lines are split.
pub const MAX_LINE: usize = 8192;

/// One client connection: a single request, answered from the cache or
/// relayed from the origin, then closed.
pub struct Connection<S> {
    stream: BufReader<S>,
    cache: Arc<ObjectCache>,
    max_object_size: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    ReadRequestLine,
    ReadHeaders(String),
    ParseUri {
        request_line: String,
        host_header: Option<String>,
    },
    CacheLookup(ParsedRequest),
    ServeFromCache(CacheKey, Bytes),
    ConnectUpstream(ParsedRequest, CacheKey),
    Relay {
        upstream: TcpStream,
        key: CacheKey,
    },
    CacheStore(CacheKey, Bytes),
    Reject(Response),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, cache: Arc<ObjectCache>, max_object_size: usize) -> Self {
        Self {
            stream: BufReader::new(stream),
            cache,
            max_object_size,
            state: ConnectionState::ReadRequestLine,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Errors are socket failures on the client side; every protocol-level
    /// problem is answered with a synthesized response instead. The upstream
    /// socket, when one was opened, is closed before this returns.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::ReadRequestLine => match self.read_line().await? {
                    Some(line) => {
                        tracing::debug!(request_line = %line.trim_end(), "Request line");
                        match Method::from_request_line(&line) {
                            Some(_) => ConnectionState::ReadHeaders(line),
                            None => {
                                tracing::warn!(method = %method_token(&line), "Unsupported method");
                                ConnectionState::Reject(Response::not_implemented())
                            }
                        }
                    }
                    // peer closed before sending anything
                    None => ConnectionState::Closed,
                },

                ConnectionState::ReadHeaders(request_line) => {
                    let host_header = self.read_headers().await?;
                    ConnectionState::ParseUri {
                        request_line,
                        host_header,
                    }
                }

                ConnectionState::ParseUri {
                    request_line,
                    host_header,
                } => match parse_request(&request_line, host_header.as_slice()) {
                    Ok(request) => {
                        tracing::debug!(
                            host = %request.host,
                            port = %request.port,
                            path = %request.path,
                            "Parsed request"
                        );
                        ConnectionState::CacheLookup(request)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, request_line = %request_line.trim_end(), "Rejecting request");
                        ConnectionState::Reject(Self::error_response(&e))
                    }
                },

                ConnectionState::CacheLookup(request) => {
                    let key = request.cache_key();
                    match self.cache.lookup(&key).await {
                        Some(payload) => ConnectionState::ServeFromCache(key, payload),
                        None => ConnectionState::ConnectUpstream(request, key),
                    }
                }

                ConnectionState::ServeFromCache(key, payload) => {
                    self.stream.write_all(&payload).await?;
                    self.stream.flush().await?;
                    tracing::info!(key = %key, bytes = payload.len(), "Served from cache");
                    ConnectionState::Closed
                }

                ConnectionState::ConnectUpstream(request, key) => match self.open_upstream(&request).await {
                    Ok(upstream) => ConnectionState::Relay { upstream, key },
                    Err(e) => {
                        tracing::warn!(upstream = %request.authority(), error = %e, "Upstream unavailable");
                        ConnectionState::Reject(Response::bad_gateway())
                    }
                },

                ConnectionState::Relay { mut upstream, key } => {
                    let mut capture = RelayBuffer::new(self.max_object_size);
                    let result = relay(&mut upstream, &mut self.stream, &mut capture).await;
                    drop(upstream);
                    let relayed = result?;

                    let overflowed = capture.is_overflowed();
                    tracing::info!(key = %key, bytes = relayed, overflowed, "Relay finished");

                    match capture.into_cacheable() {
                        Some(payload) => ConnectionState::CacheStore(key, payload),
                        None => {
                            tracing::debug!(key = %key, overflowed, "Response not cached");
                            ConnectionState::Closed
                        }
                    }
                }

                ConnectionState::CacheStore(key, payload) => {
                    self.cache.put(key, payload).await;
                    ConnectionState::Closed
                }

                ConnectionState::Reject(response) => {
                    ResponseWriter::new(&response)
                        .write_to_stream(&mut self.stream)
                        .await?;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn open_upstream(&self, request: &ParsedRequest) -> anyhow::Result<TcpStream> {
        let mut stream = upstream::connect(request).await?;
        upstream::send_request(&mut stream, request).await?;
        Ok(stream)
    }

    /// Reads one line including its terminator. `None` means end of stream.
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = Vec::new();
        let n = (&mut self.stream)
            .take(MAX_LINE as u64)
            .read_until(b'\n', &mut line)
            .await?;

        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Consumes header lines up to the blank line (or end of stream) and
    /// keeps only the first `Host` line. Every other header is dropped as it
    /// is read.
    async fn read_headers(&mut self) -> anyhow::Result<Option<String>> {
        let mut host_header = None;

        while let Some(line) = self.read_line().await? {
            if line == "\r\n" || line == "\n" {
                break;
            }
            tracing::debug!(header = %line.trim_end(), "Header");
            if host_header.is_none() && find_host_header(std::slice::from_ref(&line)).is_some() {
                host_header = Some(line);
            }
        }

        Ok(host_header)
    }

    fn error_response(error: &ParseError) -> Response {
        match error {
            ParseError::MissingHostHeader => Response::missing_host(),
            ParseError::UnsupportedMethod => Response::not_implemented(),
            ParseError::BadRequestLine => Response::bad_request(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn connection<S>(stream: S) -> Connection<S>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        Connection::new(stream, Arc::new(ObjectCache::new(1024)), 512)
    }

    #[tokio::test]
    async fn read_headers_keeps_only_host() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let mut conn = connection(server);

        let writer = tokio::spawn(async move {
            let pad = "x".repeat(1000);
            for _ in 0..5_000 {
                client
                    .write_all(format!("X-Pad: {}\r\n", pad).as_bytes())
                    .await
                    .unwrap();
            }
            client.write_all(b"Host: example.com:8080\r\n").await.unwrap();
            client.write_all(b"X-After: 1\r\n\r\n").await.unwrap();
            client
        });

        let host_header = conn.read_headers().await.unwrap();
        writer.await.unwrap();

        assert_eq!(host_header.as_deref(), Some("Host: example.com:8080\r\n"));
    }

    #[tokio::test]
    async fn read_headers_first_host_wins() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut conn = connection(server);

        client
            .write_all(b"host: first.example\r\nHost: second.example\r\n\r\n")
            .await
            .unwrap();

        let host_header = conn.read_headers().await.unwrap();
        assert_eq!(host_header.as_deref(), Some("host: first.example\r\n"));
    }

    #[tokio::test]
    async fn read_headers_without_host() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut conn = connection(server);

        client.write_all(b"Accept: */*\r\n\r\n").await.unwrap();

        assert_eq!(conn.read_headers().await.unwrap(), None);
    }
}
