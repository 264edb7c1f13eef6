//! Error types for the DDNS sync tool
//!
//! Every component surfaces its failures as an [`Error`]; only the
//! [`Reconciler`](crate::Reconciler) decides that a failure is terminal.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Network-level failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The call exceeded its deadline
    Timeout,
    /// The remote end could not be reached (refused, unresolvable host, ...)
    Connect,
    /// Any other transport failure (reset connection, truncated body, ...)
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Timeout => f.write_str("deadline exceeded"),
            TransportKind::Connect => f.write_str("connection failed"),
            TransportKind::Other => f.write_str("transport failure"),
        }
    }
}

/// Flat classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Remote,
    Decode,
    NotFound,
    Ambiguous,
    Update,
}

/// Core error type for the DDNS sync tool
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure, including timeouts
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Failure class
        kind: TransportKind,
        /// Error message
        message: String,
    },

    /// A remote service answered with a non-success status
    #[error("Remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload that could be read but not understood
    #[error("Decode error: {0}")]
    Decode(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one record carries the same name
    #[error("Ambiguous record: {count} A records named {name}")]
    AmbiguousRecord {
        /// The duplicated record name
        name: String,
        /// How many records matched
        count: usize,
    },

    /// An edit was accepted but the provider did not echo the new content
    #[error("Unconfirmed write: expected content {expected}, provider returned {actual}")]
    Unconfirmed {
        /// Content that was written
        expected: String,
        /// Content the provider reported back
        actual: String,
    },

    /// A record update did not converge
    #[error("Update of record {record} failed: {source}")]
    Update {
        /// Name of the record that failed
        record: String,
        /// Records already written during this run (never rolled back)
        converged: Vec<String>,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(kind: TransportKind, msg: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: msg.into(),
        }
    }

    /// Create a timeout-flavoured transport error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::transport(TransportKind::Timeout, msg)
    }

    /// Create a remote error carrying the HTTP status
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Wrap a failed write of `record`
    pub fn update(record: impl Into<String>, converged: Vec<String>, source: Error) -> Self {
        Self::Update {
            record: record.into(),
            converged,
            source: Box::new(source),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Remote { .. } => ErrorKind::Remote,
            Error::Json(_) | Error::Decode(_) => ErrorKind::Decode,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AmbiguousRecord { .. } => ErrorKind::Ambiguous,
            Error::Unconfirmed { .. } | Error::Update { .. } => ErrorKind::Update,
        }
    }

    /// True when this error, or the failure it wraps, is a deadline overrun
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport { kind, .. } => *kind == TransportKind::Timeout,
            Error::Update { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status carried by a remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Update { source, .. } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_distinct_from_connect() {
        let timeout = Error::timeout("took too long");
        let refused = Error::transport(TransportKind::Connect, "refused");

        assert!(timeout.is_timeout());
        assert!(!refused.is_timeout());
        assert_eq!(timeout.kind(), refused.kind());
    }

    #[test]
    fn update_error_names_record_and_keeps_source() {
        let err = Error::update(
            "www.example.com",
            vec!["example.com".to_string()],
            Error::remote(500, "boom"),
        );

        assert_eq!(err.kind(), ErrorKind::Update);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("www.example.com"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn json_errors_classify_as_decode() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
