//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AccountSid, AuthToken, MessageReceipt, SendMessage, ValidationError};

pub(crate) const DEFAULT_API_BASE: &str = "https://api.twilio.com";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .basic_auth(
                    credentials.account_sid.as_str(),
                    Some(credentials.auth_token.as_str()),
                )
                .form(&params)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Account credentials for Twilio API calls.
///
/// The account SID is both the path parameter of the Messages resource and the
/// Basic auth username; the auth token is the password.
pub struct Credentials {
    account_sid: AccountSid,
    auth_token: AuthToken,
}

impl Credentials {
    /// Validate and pair an account SID with its auth token.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            account_sid: AccountSid::new(account_sid)?,
            auth_token: AuthToken::new(auth_token)?,
        })
    }

    /// Pair already-validated parts.
    pub fn from_parts(account_sid: AccountSid, auth_token: AuthToken) -> Self {
        Self {
            account_sid,
            auth_token,
        }
    }

    pub fn account_sid(&self) -> &AccountSid {
        &self.account_sid
    }

    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`TwilioClient`].
pub enum TwilioError {
    /// HTTP client / transport failure (DNS, TLS, connection refused, timeouts).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status without a decodable Twilio error document.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Twilio rejected the request and explained why.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        more_info: Option<String>,
    },

    /// The configured API base is not a usable URL.
    #[error("invalid API endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: EndpointError,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, thiserror::Error)]
/// Why an API base was rejected.
pub enum EndpointError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
/// Builder for [`TwilioClient`].
///
/// Use this when you need to customize the API base, timeout, or user-agent.
pub struct TwilioClientBuilder {
    credentials: Credentials,
    api_base: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl TwilioClientBuilder {
    /// Create a builder with the default API base and no timeout/user-agent override.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the API base (scheme + host, e.g. a local mock server).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`TwilioClient`].
    pub fn build(self) -> Result<TwilioClient, TwilioError> {
        let api_base = normalize_api_base(&self.api_base).map_err(|source| {
            TwilioError::InvalidEndpoint {
                endpoint: self.api_base.clone(),
                source,
            }
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| TwilioError::Transport(Box::new(err)))?;

        Ok(TwilioClient {
            credentials: self.credentials,
            api_base,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

/// Check that `api_base` is an absolute `http`/`https` URL and drop trailing slashes.
pub(crate) fn normalize_api_base(api_base: &str) -> Result<String, EndpointError> {
    let trimmed = api_base.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(EndpointError::UnsupportedScheme(other.to_owned())),
    }
}

#[derive(Clone)]
/// High-level Twilio Messages client.
///
/// Posts to `{api_base}/2010-04-01/Accounts/{AccountSid}/Messages.json` with
/// Basic auth and a form-encoded body.
pub struct TwilioClient {
    credentials: Credentials,
    api_base: String,
    http: Arc<dyn HttpTransport>,
}

impl TwilioClient {
    /// Create a client using the default API base.
    ///
    /// For more customization, use [`TwilioClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> TwilioClientBuilder {
        TwilioClientBuilder::new(credentials)
    }

    /// The URL messages are posted to.
    pub fn messages_url(&self) -> String {
        crate::transport::messages_url(&self.api_base, &self.credentials.account_sid)
    }

    /// Send one message.
    ///
    /// Errors:
    /// - [`TwilioError::Transport`] when the request could not be completed,
    /// - [`TwilioError::Api`] when Twilio answers non-2xx with an error document,
    /// - [`TwilioError::HttpStatus`] for any other non-2xx response.
    ///
    /// A 2xx response whose body cannot be decoded still counts as sent and yields
    /// an empty [`MessageReceipt`].
    pub async fn send_message(&self, request: SendMessage) -> Result<MessageReceipt, TwilioError> {
        let url = self.messages_url();
        let params = crate::transport::encode_send_message_form(&request);

        tracing::debug!(%url, to = request.to().raw(), "posting message");

        let response = self
            .http
            .post_form(&url, &self.credentials, params)
            .await
            .map_err(TwilioError::Transport)?;

        if !(200..=299).contains(&response.status) {
            if let Ok(api_error) = crate::transport::decode_api_error(&response.body) {
                return Err(TwilioError::Api {
                    status: response.status,
                    code: api_error.code,
                    message: api_error.message,
                    more_info: api_error.more_info,
                });
            }
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(TwilioError::HttpStatus {
                status: response.status,
                body,
            });
        }

        match crate::transport::decode_message_receipt(&response.body) {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                tracing::debug!(status = response.status, error = %err, "undecodable message receipt");
                Ok(MessageReceipt::default())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use crate::domain::{MessageBody, MessageStatus, RawPhoneNumber};

    use super::*;

    #[derive(Debug, Clone)]
    pub(crate) struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordedRequest {
        pub url: Option<String>,
        pub username: Option<String>,
        pub password: Option<String>,
        pub params: Vec<(String, String)>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        last: RecordedRequest,
        outcome: Result<(u16, String), String>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct FakeTransportError(String);

    impl FakeTransport {
        pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self::with_outcome(Ok((response_status, response_body.into())))
        }

        pub(crate) fn failing(reason: impl Into<String>) -> Self {
            Self::with_outcome(Err(reason.into()))
        }

        fn with_outcome(outcome: Result<(u16, String), String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last: RecordedRequest::default(),
                    outcome,
                })),
            }
        }

        pub(crate) fn last_request(&self) -> RecordedRequest {
            self.state.lock().unwrap().last.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            url: &'a str,
            credentials: &'a Credentials,
            params: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let outcome = {
                    let mut state = self.state.lock().unwrap();
                    state.last = RecordedRequest {
                        url: Some(url.to_owned()),
                        username: Some(credentials.account_sid.as_str().to_owned()),
                        password: Some(credentials.auth_token.as_str().to_owned()),
                        params,
                    };
                    state.outcome.clone()
                };
                let result: Result<HttpResponse, Box<dyn StdError + Send + Sync>> = match outcome {
                    Ok((status, body)) => Ok(HttpResponse { status, body }),
                    Err(reason) => Err(Box::new(FakeTransportError(reason))),
                };
                result
            })
        }
    }

    pub(crate) fn make_client(credentials: Credentials, transport: FakeTransport) -> TwilioClient {
        TwilioClient {
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
            http: Arc::new(transport),
        }
    }

    fn request(body: &str) -> SendMessage {
        SendMessage::new(
            RawPhoneNumber::new("+15005550006").unwrap(),
            RawPhoneNumber::new("+15005550001").unwrap(),
            MessageBody::new(body).unwrap(),
        )
    }

    #[tokio::test]
    async fn send_message_posts_form_with_basic_auth() {
        let json = r#"{"sid": "SM123", "status": "queued", "body": "hi"}"#;
        let transport = FakeTransport::new(201, json);
        let client = make_client(Credentials::new("AC123", "token").unwrap(), transport.clone());

        let receipt = client.send_message(request("hi")).await.unwrap();
        assert_eq!(receipt.sid.as_deref(), Some("SM123"));
        assert_eq!(receipt.status, Some(MessageStatus::Queued));

        let recorded = transport.last_request();
        assert_eq!(
            recorded.url.as_deref(),
            Some("https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json")
        );
        assert_eq!(recorded.username.as_deref(), Some("AC123"));
        assert_eq!(recorded.password.as_deref(), Some("token"));
        assert_eq!(
            recorded.params,
            vec![
                ("To".to_owned(), "+15005550006".to_owned()),
                ("From".to_owned(), "+15005550001".to_owned()),
                ("Body".to_owned(), "hi".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn send_message_maps_transport_failure() {
        let transport = FakeTransport::failing("dns error: no such host");
        let client = make_client(Credentials::new("AC123", "token").unwrap(), transport);

        let err = client.send_message(request("hi")).await.unwrap_err();
        match err {
            TwilioError::Transport(source) => {
                assert_eq!(source.to_string(), "dns error: no such host");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_message_maps_error_document_to_api_error() {
        let json = r#"
        {
          "code": 20003,
          "message": "Authenticate",
          "more_info": "https://www.twilio.com/docs/errors/20003",
          "status": 401
        }
        "#;
        let transport = FakeTransport::new(401, json);
        let client = make_client(Credentials::new("AC123", "wrong").unwrap(), transport);

        let err = client.send_message(request("hi")).await.unwrap_err();
        match err {
            TwilioError::Api {
                status,
                code,
                message,
                more_info,
            } => {
                assert_eq!(status, 401);
                assert_eq!(code, Some(20003));
                assert_eq!(message, "Authenticate");
                assert_eq!(
                    more_info.as_deref(),
                    Some("https://www.twilio.com/docs/errors/20003")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_message_maps_other_non_success_status() {
        let transport = FakeTransport::new(502, "<html>bad gateway</html>");
        let client = make_client(Credentials::new("AC123", "token").unwrap(), transport);

        let err = client.send_message(request("hi")).await.unwrap_err();
        assert!(matches!(
            err,
            TwilioError::HttpStatus {
                status: 502,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn send_message_maps_empty_http_body_to_none() {
        let transport = FakeTransport::new(503, "   ");
        let client = make_client(Credentials::new("AC123", "token").unwrap(), transport);

        let err = client.send_message(request("hi")).await.unwrap_err();
        assert!(matches!(
            err,
            TwilioError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn send_message_tolerates_undecodable_success_body() {
        let transport = FakeTransport::new(201, "");
        let client = make_client(Credentials::new("AC123", "token").unwrap(), transport);

        let receipt = client.send_message(request("hi")).await.unwrap();
        assert_eq!(receipt, MessageReceipt::default());
    }

    #[test]
    fn credentials_constructor_validates_inputs() {
        assert!(Credentials::new("   ", "token").is_err());
        assert!(Credentials::new("AC123", "").is_err());
    }

    #[test]
    fn builder_api_base_override_is_applied() {
        let client = TwilioClient::builder(Credentials::new("AC123", "token").unwrap())
            .api_base("http://127.0.0.1:8080/")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(
            client.messages_url(),
            "http://127.0.0.1:8080/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn builder_rejects_invalid_api_base() {
        let result = TwilioClient::builder(Credentials::new("AC123", "token").unwrap())
            .api_base("not a url")
            .build();
        assert!(matches!(
            result,
            Err(TwilioError::InvalidEndpoint {
                source: EndpointError::Parse(_),
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_non_http_scheme() {
        for api_base in ["mailto:x", "ftp://api.twilio.com"] {
            let result = TwilioClient::builder(Credentials::new("AC123", "token").unwrap())
                .api_base(api_base)
                .build();
            assert!(
                matches!(
                    result,
                    Err(TwilioError::InvalidEndpoint {
                        source: EndpointError::UnsupportedScheme(_),
                        ..
                    })
                ),
                "{api_base} should be rejected"
            );
        }
    }

    mod wire {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        use super::*;

        struct CapturedRequest {
            request_line: String,
            headers: Vec<(String, String)>,
            body: String,
        }

        impl CapturedRequest {
            fn header(&self, name: &str) -> Option<&str> {
                self.headers
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            }
        }

        /// Accept one connection, capture the request, answer with `status` and `body`.
        async fn serve_once(
            listener: TcpListener,
            status: &'static str,
            body: &'static str,
        ) -> CapturedRequest {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers were complete");
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos;
                }
            };

            let head = String::from_utf8(raw[..head_end].to_vec()).unwrap();
            let mut lines = head.split("\r\n");
            let request_line = lines.next().unwrap().to_owned();
            let headers: Vec<(String, String)> = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
                .collect();
            let content_length: usize = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .map(|(_, v)| v.parse().unwrap())
                .unwrap_or(0);

            let body_start = head_end + 4;
            while raw.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body was complete");
                raw.extend_from_slice(&chunk[..n]);
            }
            let request_body =
                String::from_utf8(raw[body_start..body_start + content_length].to_vec()).unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            CapturedRequest {
                request_line,
                headers,
                body: request_body,
            }
        }

        fn request(body: &str) -> SendMessage {
            SendMessage::new(
                RawPhoneNumber::new("+15005550006").unwrap(),
                RawPhoneNumber::new("+15005550001").unwrap(),
                MessageBody::new(body).unwrap(),
            )
        }

        #[tokio::test]
        async fn posts_basic_auth_form_request_over_http() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(serve_once(
                listener,
                "201 Created",
                r#"{"sid": "SM42", "status": "queued"}"#,
            ));

            let client = TwilioClient::builder(Credentials::new("AC123", "secret").unwrap())
                .api_base(format!("http://{addr}"))
                .build()
                .unwrap();
            let receipt = client.send_message(request("hi & bye=1")).await.unwrap();
            let captured = server.await.unwrap();

            assert_eq!(receipt.sid.as_deref(), Some("SM42"));
            assert_eq!(
                captured.request_line,
                "POST /2010-04-01/Accounts/AC123/Messages.json HTTP/1.1"
            );
            // base64("AC123:secret")
            assert_eq!(
                captured.header("authorization"),
                Some("Basic QUMxMjM6c2VjcmV0")
            );
            assert_eq!(
                captured.header("content-type"),
                Some("application/x-www-form-urlencoded")
            );
            assert_eq!(
                captured.body,
                "To=%2B15005550006&From=%2B15005550001&Body=hi+%26+bye%3D1"
            );
        }

        #[tokio::test]
        async fn maps_error_document_received_over_http() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let server = tokio::spawn(serve_once(
                listener,
                "401 Unauthorized",
                r#"{"code": 20003, "message": "Authenticate", "status": 401}"#,
            ));

            let client = TwilioClient::builder(Credentials::new("AC123", "wrong").unwrap())
                .api_base(format!("http://{addr}"))
                .build()
                .unwrap();
            let err = client.send_message(request("hi")).await.unwrap_err();
            server.await.unwrap();

            assert!(matches!(
                err,
                TwilioError::Api {
                    status: 401,
                    code: Some(20003),
                    ..
                }
            ));
        }

        #[tokio::test]
        async fn unreachable_host_is_a_transport_error() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let client = TwilioClient::builder(Credentials::new("AC123", "secret").unwrap())
                .api_base(format!("http://{addr}"))
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap();
            let err = client.send_message(request("hi")).await.unwrap_err();

            assert!(
                matches!(err, TwilioError::Transport(_)),
                "unexpected error: {err:?}"
            );
        }
    }
}
