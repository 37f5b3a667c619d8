//! Error handling for subdomain enumeration.
//!
//! Most failures in a run are recovered locally and degrade to an empty
//! result (passive source down, wordlist unreadable, host not resolving).
//! This type carries them up to the point where they are logged, and carries
//! the few that are fatal (writing the result files) out to the caller.

use std::fmt;
use std::time::Duration;

/// Main error type for enumeration operations.
#[derive(Debug, Clone)]
pub enum SubenumError {
    /// Invalid target domain
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connection, TLS, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// A passive source answered with a non-success HTTP status
    HttpStatus { service: String, status_code: u16 },

    /// JSON parsing errors for passive-source responses
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// DNS lookup failed (NXDOMAIN, SERVFAIL, no answer, ...)
    DnsError { host: String, message: String },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// File I/O errors (wordlist, output files, config files)
    FileError { path: String, message: String },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl SubenumError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn http_status<S: Into<String>>(service: S, status_code: u16) -> Self {
        Self::HttpStatus {
            service: service.into(),
            status_code,
        }
    }

    /// Create a new DNS error.
    pub fn dns<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::DnsError {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
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

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the run cannot deliver its output.
    ///
    /// Only file errors qualify: the result files are the sole deliverable.
    /// Everything else degrades the run instead of ending it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FileError { .. })
    }

    /// Whether this error came from a lookup that found nothing,
    /// as opposed to one that could not be performed.
    pub fn is_no_record(&self) -> bool {
        match self {
            Self::DnsError { message, .. } => {
                let msg = message.to_lowercase();
                msg.contains("no record") || msg.contains("nxdomain") || msg.contains("not found")
            }
            _ => false,
        }
    }
}

impl fmt::Display for SubenumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::HttpStatus {
                service,
                status_code,
            } => {
                write!(f, "{} answered with HTTP {}", service, status_code)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::DnsError { host, message } => {
                write!(f, "DNS error for '{}': {}", host, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for SubenumError {}

impl From<reqwest::Error> for SubenumError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("HTTP request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_decode() {
            Self::ParseError {
                message: format!("Response body could not be decoded: {}", err),
                content: None,
            }
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for SubenumError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for SubenumError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<regex::Error> for SubenumError {
    fn from(err: regex::Error) -> Self {
        Self::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}
