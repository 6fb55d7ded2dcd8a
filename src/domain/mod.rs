//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::SendMessage;
pub use response::{ApiErrorBody, MessageReceipt};
pub use validation::ValidationError;
pub use value::{
    AccountSid, AuthToken, MessageBody, MessageStatus, PhoneNumber, RawPhoneNumber,
};
