//! JSON-over-HTTPS transport for the CodeCommit API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::Transport;
use crate::config::ConnectionConfig;
use crate::errors::ServiceError;

/// Prefix of the `X-Amz-Target` header; the operation name follows the dot.
pub const TARGET_PREFIX: &str = "CodeCommit_20150413";
pub const CONTENT_TYPE_JSON: &str = "application/x-amz-json-1.1";

/// Signs an outgoing request, e.g. with SigV4, before it is sent.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: &mut reqwest::Request) -> Result<(), ServiceError>;
}

/// Error codes that mean the caller's credentials were refused.
const AUTH_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "ExpiredTokenException",
    "MissingAuthenticationTokenException",
    "AccessDeniedException",
];

/// Posts each operation to a single endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("signed", &self.signer.is_some())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ServiceError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| ServiceError::Parse(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        info!(endpoint = %endpoint, timeout_secs = timeout.as_secs(), "created HttpTransport");
        Ok(Self {
            http,
            endpoint,
            timeout,
            signer: None,
        })
    }

    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ServiceError> {
        Self::new(config.endpoint_url(), config.timeout(), &config.user_agent)
    }

    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The per-request timeout covers the body as well as the headers, so
    /// both stages map timeouts the same way.
    fn request_error(&self, operation: &str, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                operation: operation.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ServiceError::Http(e)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body))]
    async fn invoke(&self, operation: &str, body: Value) -> Result<Value, ServiceError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(serde_json::to_vec(&body)?)
            .timeout(self.timeout)
            .build()?;
        if let Some(ref signer) = self.signer {
            signer.sign(&mut request)?;
        }

        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| self.request_error(operation, e))?;

        let status = resp.status().as_u16();
        let error_type = resp
            .headers()
            .get("x-amzn-ErrorType")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp
            .text()
            .await
            .map_err(|e| self.request_error(operation, e))?;

        if (200..300).contains(&status) {
            debug!(status, bytes = text.len(), "call succeeded");
            if text.trim().is_empty() {
                return Ok(Value::Object(Default::default()));
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let err = error_from_response(status, error_type.as_deref(), &text);
        warn!(status, error = %err, "call failed");
        Err(err)
    }
}

/// Strip the namespace (`com.amazonaws.codecommit#`) and the trailing
/// documentation URL (`:http://...`) from an error type.
fn bare_code(raw: &str) -> &str {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    code.split(':').next().unwrap_or(code).trim()
}

/// Map an error response to a [`ServiceError`].
///
/// The code comes from the body's `__type`, falling back to the
/// `x-amzn-ErrorType` header; the message from `message` or `Message`.
pub fn error_from_response(status: u16, error_type: Option<&str>, body: &str) -> ServiceError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let code = field("__type")
        .or_else(|| error_type.map(str::to_string))
        .map(|raw| bare_code(&raw).to_string())
        .filter(|c| !c.is_empty());
    let message = field("message")
        .or_else(|| field("Message"))
        .unwrap_or_else(|| format!("HTTP {}", status));

    match code.as_deref() {
        Some("ThrottlingException") => return ServiceError::Throttled(message),
        Some(c) if AUTH_CODES.contains(&c) => {
            return ServiceError::AuthenticationFailed(format!("{}: {}", c, message))
        }
        _ => {}
    }
    match status {
        429 => ServiceError::Throttled(message),
        401 | 403 => ServiceError::AuthenticationFailed(format!("HTTP {}: {}", status, message)),
        _ => ServiceError::Service {
            code: code.unwrap_or_else(|| "UnknownError".into()),
            message,
            status,
        },
    }
}
