//! Typed Rust client and one-shot sender for the Twilio Messages API.
//!
//! The crate keeps a domain layer of strong types, a transport layer for
//! wire-format details, and a small client layer orchestrating the request.
//!
//! ```rust,no_run
//! use twilio_sms::{MessageSender, SenderConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sender = MessageSender::new(SenderConfig::from_env()?)?;
//!     let receipt = sender.send("hi").await?;
//!     println!("sid: {:?}", receipt.sid);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod logger;
pub mod sender;
mod transport;

pub use client::{Credentials, EndpointError, TwilioClient, TwilioClientBuilder, TwilioError};
pub use config::{ConfigError, SenderConfig};
pub use domain::{
    AccountSid, ApiErrorBody, AuthToken, MessageBody, MessageReceipt, MessageStatus, PhoneNumber,
    RawPhoneNumber, SendMessage, ValidationError,
};
pub use sender::MessageSender;
