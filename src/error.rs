use crate::locator::Locator;
use std::time::Duration;
use thiserror::Error;

/// Main error type for storefront-e2e
#[derive(Error, Debug)]
pub enum E2eError {
    #[error("CDP connection error: {0}")]
    CdpConnection(String),

    #[error("CDP protocol error: {0}")]
    CdpProtocol(String),

    #[error("JavaScript evaluation error: {0}")]
    JavaScriptError(String),

    #[error("Element not found: {locator} not visible within {timeout:?}")]
    ElementNotFound { locator: Locator, timeout: Duration },

    #[error("Element not clickable: {locator} not clickable within {timeout:?}")]
    NotClickable { locator: Locator, timeout: Duration },

    #[error("Stale element handle: {0}")]
    StaleElement(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Illegal state for {transition}: expected one of {expected}, found {actual}")]
    InvalidState {
        transition: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout: operation timed out after {timeout}ms")]
    Timeout { timeout: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, E2eError>;

impl E2eError {
    pub fn cdp_connection(msg: impl Into<String>) -> Self {
        Self::CdpConnection(msg.into())
    }

    pub fn cdp_protocol(msg: impl Into<String>) -> Self {
        Self::CdpProtocol(msg.into())
    }

    pub fn javascript_error(msg: impl Into<String>) -> Self {
        Self::JavaScriptError(msg.into())
    }

    pub fn stale_element(msg: impl Into<String>) -> Self {
        Self::StaleElement(msg.into())
    }

    pub fn format_error(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Synchronization failures: the expected element never reached the
    /// required condition within its budget.
    pub fn is_sync_failure(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::NotClickable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation_methods() {
        let error = E2eError::cdp_connection("connection failed");
        assert!(matches!(error, E2eError::CdpConnection(_)));
        assert_eq!(format!("{}", error), "CDP connection error: connection failed");

        let error = E2eError::cdp_protocol("invalid response");
        assert!(matches!(error, E2eError::CdpProtocol(_)));

        let error = E2eError::format_error("no '$' in 'Total: 12'");
        assert!(matches!(error, E2eError::Format(_)));

        let error = E2eError::stale_element("7");
        assert!(matches!(error, E2eError::StaleElement(_)));
    }

    #[test]
    fn test_element_not_found_carries_locator_and_timeout() {
        let error = E2eError::ElementNotFound {
            locator: Locator::id("login-button"),
            timeout: Duration::from_secs(10),
        };
        let message = error.to_string();
        assert!(message.contains("id=login-button"));
        assert!(message.contains("10s"));
        assert!(error.is_sync_failure());
    }

    #[test]
    fn test_not_clickable_is_sync_failure() {
        let error = E2eError::NotClickable {
            locator: Locator::class_name("shopping_cart_link"),
            timeout: Duration::from_millis(1500),
        };
        assert!(error.is_sync_failure());
        assert!(!E2eError::format_error("x").is_sync_failure());
    }

    #[test]
    fn test_invalid_state_display() {
        let error = E2eError::InvalidState {
            transition: "finish".to_string(),
            expected: "[CheckoutOverview]".to_string(),
            actual: "Cart".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Illegal state for finish: expected one of [CheckoutOverview], found Cart"
        );
    }

    #[test]
    fn test_timeout_error() {
        let error = E2eError::Timeout { timeout: 5000 };
        assert_eq!(format!("{}", error), "Timeout: operation timed out after 5000ms");
    }

    #[test]
    fn test_error_from_conversions() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let e2e_error: E2eError = io_error.into();
        assert!(matches!(e2e_error, E2eError::Io(_)));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let e2e_error: E2eError = json_error.into();
        assert!(matches!(e2e_error, E2eError::Json(_)));

        let url_error = url::Url::parse("not_a_url").unwrap_err();
        let e2e_error: E2eError = url_error.into();
        assert!(matches!(e2e_error, E2eError::Url(_)));
    }
}
