//! Sender configuration loaded from environment variables.
//!
//! | Variable             | Required | Meaning                                  |
//! |----------------------|----------|------------------------------------------|
//! | `TWILIO_ACCOUNT_SID` | yes      | account SID, also the Basic auth user    |
//! | `TWILIO_AUTH_TOKEN`  | yes      | auth token, the Basic auth password      |
//! | `TWILIO_FROM_NUMBER` | yes      | number the message is sent from          |
//! | `TWILIO_TO_NUMBER`   | yes      | number the message is sent to (E.164)    |
//! | `TWILIO_API_BASE`    | no       | API base URL, `https://api.twilio.com`   |

use std::env;

use crate::client::{Credentials, DEFAULT_API_BASE, EndpointError, normalize_api_base};
use crate::domain::{AccountSid, AuthToken, PhoneNumber, RawPhoneNumber, ValidationError};

pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";
pub const FROM_NUMBER_VAR: &str = "TWILIO_FROM_NUMBER";
pub const TO_NUMBER_VAR: &str = "TWILIO_TO_NUMBER";
pub const API_BASE_VAR: &str = "TWILIO_API_BASE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },

    #[error("{var} is invalid: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("{var} is not a usable API base: {source}")]
    InvalidEndpoint {
        var: &'static str,
        #[source]
        source: EndpointError,
    },
}

/// Everything needed to send a message, fixed for the lifetime of a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    pub credentials: Credentials,
    pub from: RawPhoneNumber,
    pub to: RawPhoneNumber,
    pub api_base: String,
}

impl SenderConfig {
    /// Read the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env file"),
        }
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let account_sid =
            AccountSid::new(required(ACCOUNT_SID_VAR)?).map_err(invalid(ACCOUNT_SID_VAR))?;
        let auth_token =
            AuthToken::new(required(AUTH_TOKEN_VAR)?).map_err(invalid(AUTH_TOKEN_VAR))?;
        let from =
            RawPhoneNumber::new(required(FROM_NUMBER_VAR)?).map_err(invalid(FROM_NUMBER_VAR))?;
        // The sender may be an alphanumeric id; the recipient must be a phone number.
        let to: RawPhoneNumber = PhoneNumber::parse(None, required(TO_NUMBER_VAR)?)
            .map_err(invalid(TO_NUMBER_VAR))?
            .into();
        let api_base = match lookup(API_BASE_VAR).filter(|value| !value.trim().is_empty()) {
            Some(value) => normalize_api_base(&value).map_err(|source| {
                ConfigError::InvalidEndpoint {
                    var: API_BASE_VAR,
                    source,
                }
            })?,
            None => DEFAULT_API_BASE.to_owned(),
        };

        Ok(Self {
            credentials: Credentials::from_parts(account_sid, auth_token),
            from,
            to,
            api_base,
        })
    }
}

fn invalid(var: &'static str) -> impl FnOnce(ValidationError) -> ConfigError {
    move |source| ConfigError::Invalid { var, source }
}
