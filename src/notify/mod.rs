//! Push notifications to a messaging service.
//!
//! Notifications are fire-and-forget. [`Notifier::send_notification`] never
//! brings the link up on its own and never reports failure to the caller;
//! it logs the outcome and returns. The caller may re-send on a later event.

#![allow(missing_docs)]

pub mod messages;

use crate::config::{ConfigError, MAX_RECIPIENT_LEN, PushConfig};
use crate::error::ReportError;
use crate::network::application::http::client::{Header, MAX_HEADER_VALUE_LEN};
use crate::network::application::http::{Client, Response};
use crate::network::link::Link;
use crate::network::{Connect, Endpoint, TlsVerification};
use crate::room::{DeviceState, ROOM_COUNT};
use crate::system::Liveness;
use core::fmt::Write;
use heapless::String;
use log::{debug, error, info, warn};
use serde::Serialize;

/// Longest message text accepted for delivery.
pub const MAX_MESSAGE_LEN: usize = 512;
/// Capacity of an encoded push request body.
pub const MAX_PUSH_PAYLOAD_LEN: usize = 1536;

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct PushPayload<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

/// Encodes the push request body for `message` into `buf`.
///
/// The text is escaped as a JSON string, so quotes, backslashes and control
/// characters in it cannot break the document.
pub fn encode_push(recipient: &str, message: &str, buf: &mut [u8]) -> Result<usize, ReportError> {
    let payload = PushPayload {
        to: recipient,
        messages: [TextMessage {
            kind: "text",
            text: message,
        }],
    };
    serde_json_core::to_slice(&payload, buf).map_err(|_| ReportError::EncodeFailure)
}

/// Delivers text messages to one configured recipient.
#[derive(Debug)]
pub struct Notifier<N> {
    connector: N,
    endpoint: Endpoint,
    authorization: Header,
    recipient: String<MAX_RECIPIENT_LEN>,
}

impl<N: Connect> Notifier<N> {
    pub fn new(config: &PushConfig, connector: N) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint()?;
        if endpoint.tls == TlsVerification::Insecure {
            warn!(
                "push: certificate verification disabled for {}",
                config.endpoint
            );
        }

        let mut bearer: String<MAX_HEADER_VALUE_LEN> = String::new();
        write!(bearer, "Bearer {}", config.token).map_err(|_| ConfigError::FieldTooLong)?;
        let authorization =
            Header::new("Authorization", &bearer).map_err(|_| ConfigError::FieldTooLong)?;

        Ok(Self {
            connector,
            endpoint,
            authorization,
            recipient: config.recipient.clone(),
        })
    }

    /// Sends `message` if the link is up right now.
    ///
    /// `watchdog` is signalled after the push request returns.
    pub fn send_notification<L, W>(&mut self, link: &L, watchdog: &mut W, message: &str)
    where
        L: Link + ?Sized,
        W: Liveness,
    {
        if !link.is_up() {
            warn!("push: link down, notification dropped");
            return;
        }

        let result = self.dispatch(message);
        watchdog.signal();

        match result {
            Ok(response) => {
                info!("push: status {}", response.status_code);
                debug!(
                    "push: response {}",
                    response.body_str().unwrap_or("<non-utf8>")
                );
            }
            Err(ReportError::AllocationFailure) => {
                error!("push: out of memory for secure client")
            }
            Err(e) => warn!("push: failed: {:?}", e),
        }
    }

    /// Announces that room `room_index` (0-based) needs cleaning.
    pub fn notify_cleaning_required<L, W>(
        &mut self,
        link: &L,
        watchdog: &mut W,
        room_index: usize,
        use_count: u32,
    ) where
        L: Link + ?Sized,
        W: Liveness,
    {
        let text = messages::cleaning_required(room_index, use_count);
        self.send_notification(link, watchdog, &text);
    }

    pub fn notify_counters_reset<L, W>(&mut self, link: &L, watchdog: &mut W)
    where
        L: Link + ?Sized,
        W: Liveness,
    {
        let text = messages::counters_reset();
        self.send_notification(link, watchdog, &text);
    }

    /// Periodic summary of the cleaning flag and per-room use counts.
    pub fn notify_heartbeat<L, W>(&mut self, link: &L, watchdog: &mut W, state: &DeviceState)
    where
        L: Link + ?Sized,
        W: Liveness,
    {
        let counts: [u32; ROOM_COUNT] = core::array::from_fn(|i| state.rooms[i].use_count);
        let text = messages::heartbeat(state.cleaning_required, counts);
        self.send_notification(link, watchdog, &text);
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn dispatch(&mut self, message: &str) -> Result<Response, ReportError> {
        let mut payload = [0u8; MAX_PUSH_PAYLOAD_LEN];
        let len = encode_push(&self.recipient, message, &mut payload)?;
        let payload = &payload[..len];
        debug!(
            "push: payload {}",
            core::str::from_utf8(payload).unwrap_or("<non-utf8>")
        );

        let connection = self.connector.connect(&self.endpoint)?;
        let mut client = Client::new(connection);
        let response = client.post_json(
            &self.endpoint,
            core::slice::from_ref(&self.authorization),
            payload,
        );
        if let Err(e) = client.close() {
            debug!("push: close failed: {:?}", e);
        }
        Ok(response?)
    }
}
