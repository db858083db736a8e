//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client implementation designed specifically
//! for embedded systems and `no_std` environments. It focuses on simplicity and
//! predictable memory usage.
//!
//! # Features
//!
//! - Synchronous request/response model
//! - Fixed-size buffers for predictable memory usage
//! - Support for custom headers
//! - Oversized answers are returned truncated, never dropped
//! - Single-shot `POST` exchanges with `Connection: close`
//! - `post_json` helper that fills in `Host`, `Content-Type` and `Content-Length`
//!
//! # Usage
//!
//! The main entry point is the [`client::Client`] which works with any connection
//! type implementing the [`crate::network::Connection`] trait.
//!
//! ```rust,no_run
//! use roomlink::network::application::http::Client;
//! use roomlink::network::{Endpoint, TlsVerification};
//! # use roomlink::network::Connection;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl roomlink::network::Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl roomlink::network::Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> { Ok(0) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl roomlink::network::Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let endpoint = Endpoint::parse("http://10.0.0.5:8000/api/restroom/status", TlsVerification::Verify).unwrap();
//! let mut client = Client::new(MockConnection);
//!
//! // let response = client.post_json(&endpoint, &[], br#"{"device_id":"wc-01"}"#)?;
//! ```

/// HTTP client implementation and supporting types.
///
/// Contains the main [`Client`](client::Client) struct and all related types
/// for making HTTP requests and handling responses.
pub mod client;

pub use client::{Client, Header, Response};
