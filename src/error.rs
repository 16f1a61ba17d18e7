//! Error types for pipecopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during a copy operation, and the [`Result`] type alias.
//!
//! Every variant belongs to one of three classes, exposed via
//! [`Error::class`]:
//!
//! | Class | Meaning |
//! |-------|---------|
//! | [`ErrorClass::Validation`] | Malformed request, rejected before any I/O |
//! | [`ErrorClass::Resolution`] | Metadata probe failed or size undetermined |
//! | [`ErrorClass::Transport`] | Failure during the actual read or write |

use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::endpoint::Role;

/// Result type for pipecopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Useful for mapping errors onto exit codes or API status codes without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or missing request parameter. Surfaced before any I/O.
    Validation,
    /// Metadata probe (HEAD request or file stat) failed, or the source
    /// size remained undetermined. Surfaced before the transfer begins.
    Resolution,
    /// Failure during the transfer itself: network error, filesystem I/O
    /// error, or a truncated stream.
    Transport,
}

/// Errors that can occur during a copy operation.
///
/// Variants include the path or URL involved to aid debugging. Use the
/// [`std::error::Error`] trait methods to access underlying causes where
/// applicable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The copy operation id was empty
    #[error("copy id must not be empty")]
    EmptyId,

    /// A filesystem endpoint was declared with an empty path
    #[error("{role} filesystem path must not be empty")]
    EmptyPath {
        /// Which endpoint the path belonged to
        role: Role,
    },

    /// An HTTP endpoint was declared with an empty URL
    #[error("{role} url must not be empty")]
    EmptyUrl {
        /// Which endpoint the URL belonged to
        role: Role,
    },

    /// An HTTP endpoint URL failed to parse
    #[error("{role} url is invalid: {url}")]
    InvalidUrl {
        /// Which endpoint the URL belonged to
        role: Role,
        /// The offending URL
        url: String,
        /// Underlying parse error
        source: url::ParseError,
    },

    /// An HTTP endpoint URL used a scheme other than http/https
    #[error("{role} url has unsupported scheme \"{scheme}\" (expected http or https)")]
    UnsupportedScheme {
        /// Which endpoint the URL belonged to
        role: Role,
        /// The offending scheme
        scheme: String,
    },

    /// An HTTP source was declared without a request method
    #[error("http source requires a method")]
    MissingMethod,

    /// An HTTP endpoint declared a malformed request method
    #[error("invalid http method: {method}")]
    InvalidMethod {
        /// The offending method string
        method: String,
    },

    /// An HTTP endpoint declared a malformed header name or value
    #[error("invalid http header: {name}")]
    InvalidHeader {
        /// Name of the offending header
        name: String,
    },

    /// The metadata HEAD probe failed at the transport level
    #[error("HEAD probe failed: {url}")]
    Probe {
        /// Probed URL
        url: Url,
        /// Underlying HTTP error
        source: reqwest::Error,
    },

    /// The metadata HEAD probe answered with a non-success status
    #[error("HEAD probe answered {status}: {url}")]
    ProbeStatus {
        /// Probed URL
        url: Url,
        /// Response status
        status: StatusCode,
    },

    /// Failed to stat a filesystem source
    #[error("failed to stat source file: {path}")]
    Stat {
        /// Source path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Source size remained undetermined after resolution
    #[error("source size could not be determined")]
    MissingSize,

    /// Failed to open a filesystem source for reading
    #[error("failed to open source file: {path}")]
    OpenSource {
        /// Source path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Failed to create a filesystem destination
    #[error("failed to create destination file: {path}")]
    CreateDestination {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Failed to read a chunk from the source stream
    #[error("failed to read from source")]
    Read {
        /// Underlying IO error
        source: io::Error,
    },

    /// Failed to write a chunk to a filesystem destination
    #[error("failed to write destination file: {path}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// An HTTP request failed at the transport level
    #[error("http request failed: {url}")]
    Request {
        /// Request URL
        url: Url,
        /// Underlying HTTP error
        source: reqwest::Error,
    },

    /// An HTTP endpoint answered with a non-success status
    #[error("http endpoint answered {status}: {url}")]
    Status {
        /// Request URL
        url: Url,
        /// Response status
        status: StatusCode,
    },

    /// Failed to read an HTTP destination's response body
    #[error("failed to read http response body: {url}")]
    ResponseBody {
        /// Request URL
        url: Url,
        /// Underlying HTTP error
        source: reqwest::Error,
    },

    /// An HTTP destination declared a JSON content type but sent a body
    /// that failed to parse
    #[error("destination returned malformed json: {url}")]
    InvalidJson {
        /// Request URL
        url: Url,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// The source stream ended before the declared number of bytes arrived
    #[error("transfer truncated: {transferred} of {expected} bytes")]
    Truncated {
        /// Declared transfer length
        expected: u64,
        /// Bytes actually transferred
        transferred: u64,
    },

    /// The destination stream closed before the transfer finished
    #[error("destination stream closed before the transfer finished")]
    Channel,
}

impl Error {
    /// Classify this error for exit-code or status mapping.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyId
            | Self::EmptyPath { .. }
            | Self::EmptyUrl { .. }
            | Self::InvalidUrl { .. }
            | Self::UnsupportedScheme { .. }
            | Self::MissingMethod
            | Self::InvalidMethod { .. }
            | Self::InvalidHeader { .. } => ErrorClass::Validation,

            Self::Probe { .. }
            | Self::ProbeStatus { .. }
            | Self::Stat { .. }
            | Self::MissingSize => ErrorClass::Resolution,

            Self::OpenSource { .. }
            | Self::CreateDestination { .. }
            | Self::Read { .. }
            | Self::Write { .. }
            | Self::Request { .. }
            | Self::Status { .. }
            | Self::ResponseBody { .. }
            | Self::InvalidJson { .. }
            | Self::Truncated { .. }
            | Self::Channel => ErrorClass::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_class() {
        assert_eq!(Error::EmptyId.class(), ErrorClass::Validation);
        assert_eq!(
            Error::EmptyPath { role: Role::Source }.class(),
            ErrorClass::Validation
        );
        assert_eq!(
            Error::MissingMethod.class(),
            ErrorClass::Validation
        );
    }

    #[test]
    fn test_resolution_class() {
        assert_eq!(Error::MissingSize.class(), ErrorClass::Resolution);
        let stat = Error::Stat {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(stat.class(), ErrorClass::Resolution);
    }

    #[test]
    fn test_transport_class() {
        let truncated = Error::Truncated {
            expected: 2048,
            transferred: 1024,
        };
        assert_eq!(truncated.class(), ErrorClass::Transport);
        assert_eq!(Error::Channel.class(), ErrorClass::Transport);
    }

    #[test]
    fn test_truncated_display() {
        let error = Error::Truncated {
            expected: 2048,
            transferred: 1024,
        };
        let msg = format!("{}", error);
        assert!(msg.contains("1024 of 2048 bytes"));
    }
}
