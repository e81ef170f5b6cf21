//! Unified error type for the Stockline console.

use stockline_router::RouterError;
use stockline_session::SessionError;
use stockline_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `stockline` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attribute
/// on each variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum StocklineError {
    /// Building the HTTP client failed (bad base URL, TLS setup).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Sign-in, sign-out or session expiry.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A rules file parsed but describes a table that would strand some
    /// role or area.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// A configuration value was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use stockline_protocol::Role;
    use stockline_router::Area;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::InvalidBaseUrl("ftp://nope".into());
        let stockline_err: StocklineError = err.into();
        assert!(matches!(stockline_err, StocklineError::Transport(_)));
        assert!(stockline_err.to_string().contains("ftp://nope"));
    }

    #[test]
    fn test_from_session_error_keeps_message() {
        let err = SessionError::Authentication("Invalid email or password.".into());
        let stockline_err: StocklineError = err.into();
        assert!(matches!(stockline_err, StocklineError::Session(_)));
        assert_eq!(stockline_err.to_string(), "Invalid email or password.");
    }

    #[test]
    fn test_from_router_error() {
        let err = RouterError::UnreachableDefault {
            role: Role::Management,
            area: Area::Admin,
        };
        let stockline_err: StocklineError = err.into();
        assert!(matches!(stockline_err, StocklineError::Router(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = StocklineError::Config("STOCKLINE_REQUEST_TIMEOUT_SECS: not a number".into());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
