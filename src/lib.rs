//! relaycache - caching forward proxy
//!
//! Core library: the shared object cache, the HTTP/1.0 request pipeline and
//! the origin relay.

pub mod cache;
pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
