//! Error types for the CodeCommit core library.
//!
//! Each layer has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing vocabularies or building request envelopes.
///
/// All of these are detected locally, before any network round-trip, and
/// are recoverable by correcting the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A field violates its documented length, pattern or presence rule.
    #[error("invalid value for '{field}' ({constraint}): {value:?}")]
    Validation {
        field: String,
        constraint: String,
        value: String,
    },

    /// A string is outside the closed set of an enumerated field.
    #[error("'{value}' is not a valid {family}")]
    InvalidEnumValue { family: &'static str, value: String },

    /// A cross-field rule is broken.
    #[error("{rule}: {detail}")]
    ConstraintViolation { rule: &'static str, detail: String },
}

impl ModelError {
    pub(crate) fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
        }
    }

    pub(crate) fn violation(rule: &'static str, detail: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            rule,
            detail: detail.into(),
        }
    }

    /// The offending field, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Service / transport errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the transport collaborator or the remote service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("CodeCommit HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete within the configured timeout.
    #[error("CodeCommit call {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    /// Credentials were missing, expired or rejected.
    #[error("CodeCommit authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service asked the caller to slow down.
    #[error("CodeCommit request throttled: {0}")]
    Throttled(String),

    /// The service returned a modeled error such as
    /// `ManualMergeRequiredException`.
    #[error("CodeCommit {code} (HTTP {status}): {message}")]
    Service {
        code: String,
        message: String,
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("CodeCommit response parse error: {0}")]
    Parse(String),
}

/// Service error codes that mean the branches cannot be merged without
/// caller-supplied resolution.
const MANUAL_MERGE_CODES: &[&str] = &["ManualMergeRequiredException"];

/// Service error codes worth retrying for idempotent calls.
const TRANSIENT_CODES: &[&str] = &[
    "ThrottlingException",
    "ServiceUnavailableException",
    "InternalFailure",
    "ConcurrentReferenceUpdateException",
];

impl ServiceError {
    /// The modeled error code, if the service returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the merge was rejected because conflicts need resolving.
    pub fn is_manual_merge_required(&self) -> bool {
        self.code().is_some_and(|c| MANUAL_MERGE_CODES.contains(&c))
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Timeout { .. } | Self::Throttled(_) => true,
            Self::Service { code, status, .. } => {
                *status >= 500 || TRANSIENT_CODES.contains(&code.as_str())
            }
            Self::AuthenticationFailed(_) | Self::Parse(_) => false,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
