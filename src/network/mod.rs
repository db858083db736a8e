//! A network abstraction layer for the reporting controller
//!
//! This module provides the transport traits the reporting core is built on,
//! the endpoint description shared by both outbound channels, the HTTP client
//! implementation, and the radio link manager that keeps the station usable.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Parsed remote endpoints and TLS verification policy
pub mod endpoint;

/// Application protocols spoken over a [`Connection`]
pub mod application;

/// Radio link supervision
pub mod link;

pub use endpoint::{Endpoint, Scheme, TlsVerification};

/// Re-exports of common traits
pub mod prelude {
    pub use super::link::{Link, Radio};
    pub use super::{Close, Connect, Connection, Read, Write};
}

// Core synchronous traits
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
///
/// Implementations open a plain TCP stream for [`Scheme::Http`] endpoints and
/// a TLS stream for [`Scheme::Https`] endpoints, validating the server
/// certificate unless the endpoint carries [`TlsVerification::Insecure`].
/// A connector that cannot allocate its secure client reports
/// [`error::Error::OutOfMemory`].
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Open a connection to the endpoint
    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Connection, error::Error>;
}

impl<T: Connect> Connect for &mut T {
    type Connection = T::Connection;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Connection, error::Error> {
        (**self).connect(endpoint)
    }
}
