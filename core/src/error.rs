//! Error types for the task list client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the task
//! does not exist" from "the server refused the request". Other non-2xx
//! responses land in `Server` with the message from the `{"error": ...}`
//! body. Variants carry owned strings so one failure can be fanned out to
//! every cache subscriber.

use thiserror::Error;

/// Errors returned by the resource client and the `TodoClient` parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS,
    /// timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server returned 404.
    #[error("task not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body was not valid JSON or violated the task schema.
    #[error("invalid response: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
