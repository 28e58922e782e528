//! Origin → client byte relay
//!
//! The relay streams every upstream chunk to the client as soon as it
//! arrives and mirrors it into a [`RelayBuffer`] until the per-object ceiling
//! is crossed. Delivery to the client never depends on the capture.

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of each upstream read.
pub const CHUNK_SIZE: usize = 8192;

/// Capture buffer for one response, capped at `limit` bytes.
#[derive(Debug)]
pub struct RelayBuffer {
    buf: BytesMut,
    limit: usize,
    overflowed: bool,
}

impl RelayBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
            overflowed: false,
        }
    }

    /// Appends `chunk` unless doing so would pass the ceiling.
    ///
    /// The first chunk that does not fit sets `overflowed` for good and drops
    /// what was captured so far.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.overflowed {
            return;
        }
        if self.buf.len() + chunk.len() > self.limit {
            self.overflowed = true;
            self.buf = BytesMut::new();
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The captured response, if it is eligible for caching.
    pub fn into_cacheable(self) -> Option<Bytes> {
        if self.overflowed || self.buf.is_empty() {
            None
        } else {
            Some(self.buf.freeze())
        }
    }
}

/// Copies `upstream` to `client` until end of stream.
///
/// An upstream read error is treated as end of stream. A client write error
/// is returned, and the capture must then be discarded by the caller.
/// Returns the number of bytes delivered to the client.
pub async fn relay<R, W>(upstream: &mut R, client: &mut W, capture: &mut RelayBuffer) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut relayed = 0;

    loop {
        let n = match upstream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, relayed, "Upstream read failed, ending relay");
                break;
            }
        };

        client
            .write_all(&chunk[..n])
            .await
            .context("Failed to write response to client")?;
        relayed += n;

        capture.push(&chunk[..n]);
    }

    client.flush().await.context("Failed to flush client")?;
    Ok(relayed)
}
