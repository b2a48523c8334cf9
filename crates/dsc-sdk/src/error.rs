//! Error types for the disposable smart contract SDK.
//!
//! This module provides a unified error type [`DscError`] covering every
//! failure that can happen while building, signing, announcing or tracking
//! transactions.

use thiserror::Error;

/// A specialized Result type for SDK operations.
pub type DscResult<T> = Result<T, DscError>;

/// The main error type for the SDK.
///
/// Ledger-side rejections of an announced transaction are not errors: they are
/// reported through [`Outcome::Failed`](crate::broadcast::Outcome::Failed).
/// This type covers everything that prevents a flow from reaching such an
/// outcome in the first place.
#[derive(Error, Debug)]
pub enum DscError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Error reported by the websocket layer
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid hash value
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Invalid namespace name or identifier
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Invalid mosaic identifier
    #[error("Invalid mosaic id: {0}")]
    InvalidMosaicId(String),

    /// Transaction building error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// API returned an error response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the node
        message: String,
        /// Error code from the node (for example `InvalidArgument`)
        code: Option<String>,
    },

    /// The node could not be reached or answered unexpectedly during setup
    #[error("Connection error: {0}")]
    Connection(String),

    /// The event subscription failed or ended before a terminal event
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A contract parameter is missing or malformed
    #[error("Invalid parameter '{name}': {message}")]
    Parameter {
        /// Parameter name
        name: String,
        /// What was wrong with it
        message: String,
    },

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal SDK error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "private_key",
    "privatekey",
    "secret",
    "password",
    "seed phrase",
];

impl DscError {
    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new parameter error
    pub fn parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            code: None,
        }
    }

    /// Creates a new API error carrying the node's error code
    pub fn api_with_code(
        status_code: u16,
        message: impl Into<String>,
        code: Option<String>,
    ) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            code,
        }
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Api {
                    status_code: 404,
                    ..
                }
        )
    }

    /// Returns true if the node could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::WebSocket(_) | Self::Connection(_) | Self::Subscription(_) => true,
            _ => false,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are removed, very long messages are truncated and
    /// messages that look like they carry key material are redacted.
    pub fn sanitized_message(&self) -> String {
        Self::sanitize_string(&self.to_string())
    }

    fn sanitize_string(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.chars().count() > MAX_ERROR_MESSAGE_LENGTH {
            let truncated: String = cleaned.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
            format!(
                "{truncated}... [truncated, total length: {}]",
                cleaned.len()
            )
        } else {
            cleaned
        }
    }

    /// Returns the error message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(_) => "Network error occurred",
            Self::Json(_) => "Failed to process response",
            Self::Url(_) => "Invalid URL",
            Self::Hex(_) => "Invalid hex format",
            Self::WebSocket(_) => "Event stream connection failed",
            Self::InvalidAddress(_) => "Invalid account address",
            Self::InvalidPublicKey(_) => "Invalid public key",
            Self::InvalidPrivateKey(_) => "Invalid private key",
            Self::InvalidSignature(_) => "Invalid signature",
            Self::SignatureVerificationFailed => "Signature verification failed",
            Self::InvalidHash(_) => "Invalid transaction hash",
            Self::InvalidNamespace(_) => "Invalid namespace",
            Self::InvalidMosaicId(_) => "Invalid mosaic id",
            Self::Transaction(_) => "Transaction error",
            Self::NotFound(_)
            | Self::Api {
                status_code: 404, ..
            } => "Resource not found",
            Self::Api { status_code, .. } if *status_code >= 500 => "Server error",
            Self::Api { .. } => "Node rejected the request",
            Self::Connection(_) => "Could not connect to the node",
            Self::Subscription(_) => "Event subscription failed",
            Self::Parameter { .. } => "Invalid contract parameter",
            Self::Config(_) => "Configuration error",
            Self::Internal(_) => "Internal error",
            Self::Other(_) => "An error occurred",
        }
    }
}
