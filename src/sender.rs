//! One-shot message sender bound to a fixed sender/recipient pair.

use crate::client::{TwilioClient, TwilioError};
use crate::config::SenderConfig;
use crate::domain::{MessageBody, MessageReceipt, RawPhoneNumber, SendMessage};

#[derive(Clone)]
pub struct MessageSender {
    client: TwilioClient,
    from: RawPhoneNumber,
    to: RawPhoneNumber,
}

impl MessageSender {
    /// Build a sender (and its HTTP client) from configuration.
    pub fn new(config: SenderConfig) -> Result<Self, TwilioError> {
        let client = TwilioClient::builder(config.credentials)
            .api_base(config.api_base)
            .build()?;
        Ok(Self::from_client(client, config.from, config.to))
    }

    pub fn from_client(client: TwilioClient, from: RawPhoneNumber, to: RawPhoneNumber) -> Self {
        Self { client, from, to }
    }

    /// Send `body` to the configured recipient.
    pub async fn send(&self, body: &str) -> Result<MessageReceipt, TwilioError> {
        let request = SendMessage::new(
            self.to.clone(),
            self.from.clone(),
            MessageBody::new(body)?,
        );
        self.client.send_message(request).await
    }

    /// Send `body` and log any failure instead of returning it.
    ///
    /// Failures are reported with `tracing::error!`; success only emits a debug
    /// event. Returns the receipt when the message was accepted.
    pub async fn send_and_report(&self, body: &str) -> Option<MessageReceipt> {
        match self.send(body).await {
            Ok(receipt) => {
                tracing::debug!(
                    sid = receipt.sid.as_deref().unwrap_or("-"),
                    status = ?receipt.status,
                    "message sent"
                );
                Some(receipt)
            }
            Err(err) => {
                tracing::error!(error = %err, to = self.to.raw(), "failed to send message");
                None
            }
        }
    }
}
