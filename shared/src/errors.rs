//! Error kinds shared across the API surface

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of every failure the API can produce.
///
/// Clients only ever see the rendered envelope; the kind decides the
/// status code when the richer taxonomy is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    Unauthorized,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::ValidationFailed => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Conflict => 409,
            ErrorKind::Unavailable => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Whether the message may be shown to clients when failures are flattened
    pub fn keeps_message_when_flattened(self) -> bool {
        matches!(self, ErrorKind::Unauthorized)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Rejection of a client-supplied post document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    #[error("post body must be a JSON object")]
    NotAnObject,

    #[error("post must have a {0}")]
    MissingField(&'static str),

    #[error("{0} must be a non-empty string")]
    InvalidField(&'static str),
}
