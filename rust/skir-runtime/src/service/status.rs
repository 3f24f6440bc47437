//! RPC failure status.

use crate::error::DecodeError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    InvalidArgument,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    Unavailable,
    Internal,
    Unknown,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::InvalidArgument => "INVALID_ARGUMENT",
            StatusKind::NotFound => "NOT_FOUND",
            StatusKind::PermissionDenied => "PERMISSION_DENIED",
            StatusKind::Unauthenticated => "UNAUTHENTICATED",
            StatusKind::Unavailable => "UNAVAILABLE",
            StatusKind::Internal => "INTERNAL",
            StatusKind::Unknown => "UNKNOWN",
        }
    }

    pub fn http_code(self) -> u16 {
        match self {
            StatusKind::InvalidArgument => 400,
            StatusKind::Unauthenticated => 401,
            StatusKind::PermissionDenied => 403,
            StatusKind::NotFound => 404,
            StatusKind::Unavailable => 503,
            StatusKind::Internal | StatusKind::Unknown => 500,
        }
    }

    /// Inverse of [`StatusKind::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        [
            StatusKind::InvalidArgument,
            StatusKind::NotFound,
            StatusKind::PermissionDenied,
            StatusKind::Unauthenticated,
            StatusKind::Unavailable,
            StatusKind::Internal,
            StatusKind::Unknown,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Inverse of [`StatusKind::http_code`]; other codes map to `Unknown`.
    pub fn from_http_code(code: u16) -> Self {
        match code {
            400 => StatusKind::InvalidArgument,
            401 => StatusKind::Unauthenticated,
            403 => StatusKind::PermissionDenied,
            404 => StatusKind::NotFound,
            503 => StatusKind::Unavailable,
            500 => StatusKind::Internal,
            _ => StatusKind::Unknown,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error half of every handler result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusKind::NotFound, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StatusKind::PermissionDenied, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Unauthenticated, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Internal, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Unknown, message)
    }

    pub fn http_code(&self) -> u16 {
        self.kind.http_code()
    }
}

impl From<DecodeError> for Status {
    fn from(err: DecodeError) -> Self {
        Status::invalid_argument(format!("failed to decode request: {err}"))
    }
}
