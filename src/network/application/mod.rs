//! # Application Layer Network Protocols
//!
//! Application layer protocols used by the reporting core. Each protocol works
//! with the core network traits and any type implementing
//! [`Connection`](crate::network::Connection).
//!
//! - **[`http`]**: HTTP/1.1 client used for the backend status report and the
//!   push-notification call

/// HTTP client implementation.
///
/// Provides a simple HTTP/1.1 client suitable for embedded systems,
/// supporting `POST` exchanges with custom headers.
pub mod http;
