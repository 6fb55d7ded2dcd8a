use crate::domain::value::MessageStatus;

/// Message resource returned by Twilio after a message was accepted.
///
/// Every field is optional: the receipt is informational and an undecodable
/// success body yields [`MessageReceipt::default`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageReceipt {
    pub sid: Option<String>,
    pub status: Option<MessageStatus>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub body: Option<String>,
    pub num_segments: Option<String>,
    pub price: Option<String>,
    pub price_unit: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub date_created: Option<String>,
}

/// Error document returned by Twilio alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: String,
    pub more_info: Option<String>,
    pub status: Option<u16>,
}
