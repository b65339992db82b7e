//! Error types for the terminology client.
//!
//! # Design
//! A non-200 status is not an error here: the service answered, and the
//! caller gets a [`TermResponse`](crate::TermResponse) with the status and
//! no body. Errors are reserved for the cases where there is no usable
//! answer at all: the request never completed, or a 200 body is not JSON.

use thiserror::Error;

/// Errors returned by `TerminologyClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or no response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server returned 200 with a body that is not valid JSON.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request envelope could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Failures below the HTTP layer. No status code exists for any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    /// DNS resolution failed, or the connection was refused or reset.
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        use std::io::ErrorKind;

        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            unreachable @ (ureq::Error::HostNotFound | ureq::Error::ConnectionFailed) => {
                TransportError::Connection(unreachable.to_string())
            }
            ureq::Error::Io(io_err) => match io_err.kind() {
                ErrorKind::TimedOut => TransportError::Timeout,
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected => TransportError::Connection(io_err.to_string()),
                _ => TransportError::Other(io_err.to_string()),
            },
            other => TransportError::Other(other.to_string()),
        }
    }
}
