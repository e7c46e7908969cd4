//! # Client Errors
//!
//! Every failure the facade can surface, as one enum. Nothing here is retried
//! or absorbed: callers see exactly what the pool or the store reported.

use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Result type for the pooled client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the pool, the transport, and the typed operation groups.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No connection became available within `max_wait`.
    #[error("connection pool exhausted: {max_total} connections in use, waited {waited:?}")]
    PoolExhausted { max_total: usize, waited: Duration },

    /// The pool was closed while the caller was waiting or before it asked.
    #[error("connection pool is closed")]
    PoolClosed,

    /// Network or IO failure while connecting, reading, or writing.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// RESP2 framing or parse error.
    #[error("protocol error")]
    Protocol,

    /// The store rejected the command (wrong type, bad argument, auth failure).
    #[error("remote command error: {message}")]
    RemoteCommand { message: String },

    /// Reply type did not match what the command returns.
    #[error("unexpected response")]
    UnexpectedResponse,

    /// A text reply was not valid UTF-8.
    #[error("reply is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A configuration property was missing, malformed, or out of range.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl ClientError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        ClientError::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn remote(message: &[u8]) -> Self {
        ClientError::RemoteCommand {
            message: String::from_utf8_lossy(message).into_owned(),
        }
    }
}
