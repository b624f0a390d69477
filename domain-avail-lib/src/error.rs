//! Error handling for the progress engine and the pipeline operations.
//!
//! One error type covers business failures reported by operations, faults
//! raised while running them, and the engine's own invariant violations.

use std::fmt;

/// Main error type for domain-avail operations.
///
/// The type is `Clone` because the same cause is carried inside an
/// [`Outcome`](crate::Outcome), handed to retry predicates and reported to
/// the event sink.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainAvailError {
    /// Network-related errors (connection, timeout, non-2xx status)
    NetworkError {
        message: String,
        status_code: Option<u16>,
    },

    /// Response bodies that could not be decoded
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// The registrar answered but reported a non-success status
    ApiError { message: String },

    /// File I/O errors when reading input or writing output
    FileError { path: String, message: String },

    /// Configuration errors (invalid settings, unparsable files)
    ConfigError { message: String },

    /// Neither arguments nor the input file yielded any names
    NoInput { message: String },

    /// Every attempt allowed by the retry budget was used up
    RetryExhausted { operation: String, retries: u32 },

    /// A step was started while no action was running
    NoActiveAction { step: String },

    /// Lookup of an action name that was never registered in this run
    UnregisteredAction { name: String },

    /// Lookup of a step name that was never registered in this run
    UnregisteredStep { name: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DomainAvailError {
    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new network error with the HTTP status that caused it.
    pub fn network_with_status<M: Into<String>>(message: M, status_code: u16) -> Self {
        Self::NetworkError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new parse error, keeping the offending content for debugging.
    pub fn parse<M: Into<String>, C: Into<String>>(message: M, content: C) -> Self {
        Self::ParseError {
            message: message.into(),
            content: Some(content.into()),
        }
    }

    /// Create a new API error.
    pub fn api<M: Into<String>>(message: M) -> Self {
        Self::ApiError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new "no input" error.
    pub fn no_input<M: Into<String>>(message: M) -> Self {
        Self::NoInput {
            message: message.into(),
        }
    }

    /// Create a new retry-exhausted error.
    pub fn retry_exhausted<O: Into<String>>(operation: O, retries: u32) -> Self {
        Self::RetryExhausted {
            operation: operation.into(),
            retries,
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short message without the category prefix, used in progress lines.
    pub fn message(&self) -> String {
        match self {
            Self::ApiError { message }
            | Self::ConfigError { message }
            | Self::NoInput { message }
            | Self::Internal { message } => message.clone(),
            Self::NetworkError { message, .. } | Self::ParseError { message, .. } => {
                message.clone()
            }
            Self::FileError { path, message } => format!("{}: {}", message, path),
            Self::RetryExhausted { retries, .. } => {
                format!("Retry count have been exceeded {}", retries)
            }
            Self::NoActiveAction { step } => format!(
                "Cannot create step '{}' when no current action performed",
                step
            ),
            Self::UnregisteredAction { name } => {
                format!("Cannot get non-existed action: {}", name)
            }
            Self::UnregisteredStep { name } => format!("Cannot get non-existed step: {}", name),
        }
    }

    /// Check if this error is a programming-invariant violation.
    ///
    /// Fatal errors never reach a retry predicate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoActiveAction { .. }
                | Self::UnregisteredAction { .. }
                | Self::UnregisteredStep { .. }
        )
    }
}

impl fmt::Display for DomainAvailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Network error (HTTP {}): {}", code, message)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ParseError { message, .. } => write!(f, "Parse error: {}", message),
            Self::ApiError { message } => write!(f, "API error: {}", message),
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::NoInput { message } => write!(f, "No input: {}", message),
            Self::RetryExhausted { operation, retries } => write!(
                f,
                "Retry count have been exceeded {} for '{}'",
                retries, operation
            ),
            Self::NoActiveAction { .. }
            | Self::UnregisteredAction { .. }
            | Self::UnregisteredStep { .. } => {
                write!(f, "Progress invariant violated: {}", self.message())
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for DomainAvailError {}

impl From<reqwest::Error> for DomainAvailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            Self::network_with_status(err.to_string(), status.as_u16())
        } else {
            Self::network(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for DomainAvailError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<serde_yaml::Error> for DomainAvailError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ParseError {
            message: format!("YAML parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for DomainAvailError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_errors_are_fatal() {
        assert!(DomainAvailError::NoActiveAction {
            step: "get_availability(0)".to_string()
        }
        .is_fatal());
        assert!(DomainAvailError::UnregisteredStep {
            name: "x".to_string()
        }
        .is_fatal());
        assert!(!DomainAvailError::network("boom").is_fatal());
        assert!(!DomainAvailError::retry_exhausted("fetch_data", 3).is_fatal());
    }

    #[test]
    fn test_message_drops_category_prefix() {
        let err = DomainAvailError::api("Response status is not success");
        assert_eq!(err.message(), "Response status is not success");
        assert_eq!(err.to_string(), "API error: Response status is not success");

        let exhausted = DomainAvailError::retry_exhausted("get_availability(0)", 8);
        assert_eq!(exhausted.message(), "Retry count have been exceeded 8");
    }
}
