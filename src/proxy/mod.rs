//! Forwarding to origin servers
//!
//! `upstream` reaches the origin and writes the rewritten request; `relay`
//! streams the answer back while capturing it for the cache.

pub mod relay;
pub mod upstream;

pub use relay::{relay, RelayBuffer, CHUNK_SIZE};
pub use upstream::{build_http_request, connect, send_request, USER_AGENT};
