use thiserror::Error;

/// Reasons the playground refuses to start an execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaygroundError {
    #[error("An API key is required before sending a request")]
    MissingCredential,
    #[error("A request is already in flight")]
    AlreadyInFlight,
}

/// The transport could not complete the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// The request could not be built locally (bad header name or value,
    /// unusable URL); nothing reached the network.
    pub invalid_request: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_request: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_request: true,
        }
    }

    pub fn cancelled() -> Self {
        Self::new("request cancelled")
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display hides the root cause ("error sending request").
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message,
            invalid_request: err.is_builder(),
        }
    }
}

/// The request body is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid JSON at line {line}, column {column}: {message}")]
pub struct BodyError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for BodyError {
    fn from(err: serde_json::Error) -> Self {
        let line = err.line();
        let column = err.column();
        let full = err.to_string();
        // serde_json appends " at line X column Y"; keep only the reason.
        let message = match full.rfind(" at line ") {
            Some(idx) => full[..idx].to_string(),
            None => full,
        };
        Self {
            message,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\": }").unwrap_err();
        let body_err = BodyError::from(err);
        assert_eq!(body_err.line, 1);
        assert!(!body_err.message.contains("at line"));
        assert!(body_err.to_string().starts_with("Invalid JSON at line 1"));
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(TransportError::cancelled().to_string(), "request cancelled");
        assert!(!TransportError::cancelled().invalid_request);
    }

    #[test]
    fn test_builder_error_is_invalid_request() {
        let err = reqwest::Client::new()
            .get("https://api.example.com/v1/usage")
            .header("bad header", "v")
            .build()
            .unwrap_err();
        let transport_err = TransportError::from(err);
        assert!(transport_err.invalid_request);
        assert!(transport_err.message.starts_with("builder error"));
    }
}
