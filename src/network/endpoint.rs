//! Parsed HTTP(S) endpoints.
//!
//! Both outbound channels are configured with plain URL strings. They are
//! parsed once, when the reporter or notifier is built, into an [`Endpoint`]
//! that a [`Connect`](super::Connect) implementation can dial directly.

use super::error::Error;
use core::str::FromStr;
use heapless::String;
use serde::Deserialize;

/// Maximum length of an endpoint host name.
pub const MAX_HOST_LEN: usize = 64;
/// Maximum length of an endpoint request path (including query).
pub const MAX_PATH_LEN: usize = 128;
/// Maximum length of a `Host` header value (`host:port`).
pub const MAX_HOST_HEADER_LEN: usize = MAX_HOST_LEN + 6;

/// URL scheme of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain-text HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// The port used when the URL does not name one.
    pub const fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// How the server certificate of a TLS endpoint is checked.
///
/// Verification is on unless a deployment opts out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsVerification {
    /// Validate the certificate chain and host name.
    #[default]
    Verify,
    /// Accept any certificate. Leaves the channel open to interception.
    Insecure,
}

/// A remote HTTP(S) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// URL scheme.
    pub scheme: Scheme,
    /// Host name or address literal, without port.
    pub host: String<MAX_HOST_LEN>,
    /// TCP port.
    pub port: u16,
    /// Request target, always starting with `/`.
    pub path: String<MAX_PATH_LEN>,
    /// Certificate policy, only consulted for [`Scheme::Https`].
    pub tls: TlsVerification,
}

impl Endpoint {
    /// Parses an absolute `http://` or `https://` URL.
    ///
    /// ```rust
    /// use roomlink::network::{Endpoint, Scheme, TlsVerification};
    ///
    /// let ep = Endpoint::parse("http://10.0.0.5:8000/api/restroom/status", TlsVerification::Verify).unwrap();
    /// assert_eq!(ep.scheme, Scheme::Http);
    /// assert_eq!(ep.host.as_str(), "10.0.0.5");
    /// assert_eq!(ep.port, 8000);
    /// assert_eq!(ep.path.as_str(), "/api/restroom/status");
    /// ```
    pub fn parse(url: &str, tls: TlsVerification) -> Result<Self, Error> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else if let Some(rest) = url.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else {
            return Err(Error::InvalidAddress);
        };

        let (authority, path) = match rest.find(['/', '?']) {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| Error::InvalidAddress)?;
                (host, port)
            }
            None => (authority, scheme.default_port()),
        };

        if host.is_empty() || port == 0 {
            return Err(Error::InvalidAddress);
        }

        let mut target: String<MAX_PATH_LEN> = String::new();
        if !path.starts_with('/') {
            target.push('/').map_err(|_| Error::InvalidAddress)?;
        }
        target.push_str(path).map_err(|_| Error::InvalidAddress)?;

        Ok(Self {
            scheme,
            host: String::from_str(host).map_err(|_| Error::InvalidAddress)?,
            port,
            path: target,
            tls,
        })
    }

    /// Whether the connection must be wrapped in TLS.
    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Value for the `Host` request header.
    pub fn host_header(&self) -> Result<String<MAX_HOST_HEADER_LEN>, Error> {
        use core::fmt::Write;

        let mut value = String::new();
        if self.port == self.scheme.default_port() {
            value
                .push_str(&self.host)
                .map_err(|_| Error::InvalidAddress)?;
        } else {
            write!(value, "{}:{}", self.host, self.port).map_err(|_| Error::InvalidAddress)?;
        }
        Ok(value)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TlsVerification {
    fn format(&self, f: defmt::Formatter) {
        match self {
            TlsVerification::Verify => defmt::write!(f, "Verify"),
            TlsVerification::Insecure => defmt::write!(f, "Insecure"),
        }
    }
}
