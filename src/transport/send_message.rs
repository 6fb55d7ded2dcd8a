use serde::Deserialize;

use crate::domain::{
    AccountSid, ApiErrorBody, MessageBody, MessageReceipt, MessageStatus, SendMessage,
};

const API_VERSION: &str = "2010-04-01";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct MessageJsonResponse {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    num_segments: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    price_unit: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJsonResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
    #[serde(default)]
    more_info: Option<String>,
    #[serde(default)]
    status: Option<u16>,
}

/// Build the Messages resource URL for an account.
///
/// The account SID is inserted verbatim; `base` must not end with `/`.
pub fn messages_url(base: &str, account_sid: &AccountSid) -> String {
    format!(
        "{base}/{API_VERSION}/Accounts/{}/Messages.json",
        account_sid.as_str()
    )
}

/// Encode the request into exactly `To`, `From`, `Body`, in that order.
///
/// Values are left unescaped; percent-encoding happens in the HTTP client.
pub fn encode_send_message_form(request: &SendMessage) -> Vec<(String, String)> {
    vec![
        (
            SendMessage::TO_FIELD.to_owned(),
            request.to().raw().to_owned(),
        ),
        (
            SendMessage::FROM_FIELD.to_owned(),
            request.from().raw().to_owned(),
        ),
        (
            MessageBody::FIELD.to_owned(),
            request.body().as_str().to_owned(),
        ),
    ]
}

pub fn decode_message_receipt(json: &str) -> Result<MessageReceipt, TransportError> {
    let parsed: MessageJsonResponse = serde_json::from_str(json)?;

    Ok(MessageReceipt {
        sid: parsed.sid,
        status: parsed.status.as_deref().map(MessageStatus::from_wire),
        to: parsed.to,
        from: parsed.from,
        body: parsed.body,
        num_segments: parsed.num_segments,
        price: parsed.price,
        price_unit: parsed.price_unit,
        error_code: parsed.error_code,
        error_message: parsed.error_message,
        date_created: parsed.date_created,
    })
}

pub fn decode_api_error(json: &str) -> Result<ApiErrorBody, TransportError> {
    let parsed: ErrorJsonResponse = serde_json::from_str(json)?;

    Ok(ApiErrorBody {
        code: parsed.code,
        message: parsed.message,
        more_info: parsed.more_info,
        status: parsed.status,
    })
}
