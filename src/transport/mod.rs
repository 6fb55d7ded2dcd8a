//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod send_message;

pub use send_message::{
    decode_api_error, decode_message_receipt, encode_send_message_form, messages_url,
};
