use crate::domain::value::{MessageBody, RawPhoneNumber};

/// One outbound message: a single recipient, a single sender, and the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    to: RawPhoneNumber,
    from: RawPhoneNumber,
    body: MessageBody,
}

impl SendMessage {
    /// Form field name for the recipient (`To`).
    pub const TO_FIELD: &'static str = "To";
    /// Form field name for the sender (`From`).
    pub const FROM_FIELD: &'static str = "From";

    pub fn new(to: RawPhoneNumber, from: RawPhoneNumber, body: MessageBody) -> Self {
        Self { to, from, body }
    }

    pub fn to(&self) -> &RawPhoneNumber {
        &self.to
    }

    pub fn from(&self) -> &RawPhoneNumber {
        &self.from
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }
}
