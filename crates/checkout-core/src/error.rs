//! Error Types

use thiserror::Error;

use crate::wire::{ApiFailure, normalize_api_failure};

/// Result type alias for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout lifecycle error taxonomy.
///
/// Each lifecycle stage catches its own failures and degrades to a visible
/// message, with two exceptions: configuration and SDK-load failures leave
/// the button unrendered with no user-visible message. That silence is
/// carried over from the original page deliberately; see `is_silent`.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Client configuration fetch failed (non-success status, malformed body).
    #[error("Configuration fetch failed: {0}")]
    ConfigFetch(String),

    /// Payment SDK load rejected.
    #[error("Payment SDK load failed: {0}")]
    SdkLoad(String),

    /// Order create request failed or returned an unusable shape.
    #[error("Order create failed: {0}")]
    OrderCreate(String),

    /// Capture request failed or returned an unusable shape.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Button render failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// An SDK callback hook failed, including illegal stage transitions.
    #[error("Callback failed: {0}")]
    Callback(String),

    /// Network-level failure before any response body arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Whether this failure is swallowed without a user-visible message.
    ///
    /// Configuration and SDK-load failures abort before anything is rendered,
    /// so there is no surface to report through. Flagged as a gap, preserved
    /// as behavior.
    pub fn is_silent(&self) -> bool {
        matches!(self, CheckoutError::ConfigFetch(_) | CheckoutError::SdkLoad(_))
    }

    /// User-facing message for errors that do reach the page.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::OrderCreate(msg) => format!("Could not initiate payment: {msg}"),
            CheckoutError::Capture(msg) => format!("Could not complete payment: {msg}"),
            CheckoutError::Render(_) => "The payment button could not be displayed.".into(),
            CheckoutError::Transport(_) => "A network error occurred. Please try again.".into(),
            other => other.to_string(),
        }
    }
}

/// Errors from the upstream payment provider client.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The provider answered with a failure body; forwarded verbatim to the
    /// component so it can normalize (or restart on a declined instrument).
    #[error("Payment API error (status {status}): {}", normalize_api_failure(.failure))]
    Api { status: u16, failure: ApiFailure },

    /// OAuth token exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Missing or invalid credentials/base URL.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_) | GatewayError::Auth(_))
    }
}
