//! HTTP/1.0 front end.
//!
//! - **`connection`**: per-connection state machine
//! - **`parser`**: request line + headers to a normalized target
//! - **`request`**: method and parsed-request types, Host header lookup
//! - **`response`**: responses the proxy synthesizes itself
//! - **`writer`**: serializes and writes those responses
//!
//! # Connection State Machine
//!
//! ```text
//!   ReadRequestLine ──(not GET)──────────────────────────► Reject(501)
//!         │
//!         ▼
//!   ReadHeaders ─► ParseUri ──(bad line / no Host)───────► Reject(400)
//!                     │
//!                     ▼
//!               CacheLookup ──(hit)──► ServeFromCache
//!                     │ miss
//!                     ▼
//!              ConnectUpstream ──(unreachable)───────────► Reject(502)
//!                     │
//!                     ▼
//!                   Relay ──(small enough)──► CacheStore
//!                     │                          │
//!                     └──────────► Closed ◄──────┘
//! ```
//!
//! Exactly one request is served per connection.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
