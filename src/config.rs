//! Startup configuration.
//!
//! All values are opaque constants to the core: they are handed in once at
//! boot, either built in code or decoded from a JSON provisioning blob, and
//! never change afterwards.
//!
//! ```rust
//! use roomlink::config::DeviceConfig;
//! use roomlink::network::TlsVerification;
//!
//! let json = r#"{
//!     "device_id": "wc-floor2",
//!     "backend_url": "http://192.168.1.20:8000/api/restroom/status",
//!     "wifi": { "ssid": "site-iot", "password": "hunter22" },
//!     "push": { "token": "abc", "recipient": "U123" }
//! }"#;
//!
//! let config = DeviceConfig::from_json(json).unwrap();
//! assert_eq!(config.link.cooldown_ms, 10_000);
//! assert_eq!(config.push.tls, TlsVerification::Verify);
//! ```

#![allow(missing_docs)]

use crate::network::{Endpoint, TlsVerification};
use heapless::String;
use serde::Deserialize;

pub const MAX_DEVICE_ID_LEN: usize = 32;
pub const MAX_URL_LEN: usize = 192;
pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;
/// Leaves room for the `Bearer ` prefix inside one header value.
pub const MAX_TOKEN_LEN: usize = 240;
pub const MAX_RECIPIENT_LEN: usize = 64;

/// LINE Messaging API push endpoint.
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";

/// Errors raised while building or decoding a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A value does not fit its fixed-capacity field.
    FieldTooLong,
    /// A URL is not an absolute `http://` or `https://` URL.
    InvalidUrl,
    /// The provisioning blob is not valid JSON for this schema.
    Parse,
}

/// Station credentials for the access point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            ssid: bounded(ssid)?,
            password: bounded(password)?,
        })
    }
}

/// Timing of the connectivity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// Minimum time between the starts of two connection attempts.
    pub cooldown_ms: u32,
    /// Interval between status polls while waiting for the link.
    pub poll_interval_ms: u32,
    /// Upper bound on one connection attempt.
    pub connect_timeout_ms: u32,
    /// Log the visible networks before connecting.
    pub scan_before_connect: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: 10_000,
            poll_interval_ms: 500,
            connect_timeout_ms: 30_000,
            scan_before_connect: false,
        }
    }
}

/// Push-notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String<MAX_URL_LEN>,
    /// Channel access token, sent as a bearer credential.
    pub token: String<MAX_TOKEN_LEN>,
    /// Recipient id the bot pushes to.
    pub recipient: String<MAX_RECIPIENT_LEN>,
    #[serde(default)]
    pub tls: TlsVerification,
}

impl PushConfig {
    /// Push to the default endpoint with certificate verification on.
    pub fn new(token: &str, recipient: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: default_push_endpoint(),
            token: bounded(token)?,
            recipient: bounded(recipient)?,
            tls: TlsVerification::Verify,
        })
    }

    pub fn with_endpoint(mut self, url: &str) -> Result<Self, ConfigError> {
        self.endpoint = bounded(url)?;
        Ok(self)
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Parsed push endpoint.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(&self.endpoint, self.tls).map_err(|_| ConfigError::InvalidUrl)
    }
}

/// Everything the core needs from the outside at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    pub device_id: String<MAX_DEVICE_ID_LEN>,
    pub backend_url: String<MAX_URL_LEN>,
    pub wifi: WifiCredentials,
    pub push: PushConfig,
    #[serde(default)]
    pub link: LinkSettings,
}

impl DeviceConfig {
    pub fn new(
        device_id: &str,
        backend_url: &str,
        wifi: WifiCredentials,
        push: PushConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            device_id: bounded(device_id)?,
            backend_url: bounded(backend_url)?,
            wifi,
            push,
            link: LinkSettings::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_link(mut self, link: LinkSettings) -> Self {
        self.link = link;
        self
    }

    /// Decodes a provisioning blob.
    ///
    /// String values are taken verbatim and must not contain JSON escapes.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let (config, _): (Self, usize) =
            serde_json_core::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed backend endpoint.
    pub fn backend_endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(&self.backend_url, TlsVerification::Verify)
            .map_err(|_| ConfigError::InvalidUrl)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.backend_endpoint()?;
        self.push.endpoint()?;
        Ok(())
    }
}

fn default_push_endpoint() -> String<MAX_URL_LEN> {
    String::try_from(DEFAULT_PUSH_ENDPOINT).unwrap_or_default()
}

fn bounded<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    String::try_from(value).map_err(|_| ConfigError::FieldTooLong)
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::FieldTooLong => defmt::write!(f, "FieldTooLong"),
            ConfigError::InvalidUrl => defmt::write!(f, "InvalidUrl"),
            ConfigError::Parse => defmt::write!(f, "Parse"),
        }
    }
}
