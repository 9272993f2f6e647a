//! Error types for the authentication gate

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error class: `unauthenticated`, `invalid_argument` or `internal`
    pub code: String,
    /// Human-readable reason
    pub message: String,
}

impl ErrorBody {
    pub(crate) fn response(status: StatusCode, message: String) -> Response {
        let code = match status {
            StatusCode::UNAUTHORIZED => "unauthenticated",
            StatusCode::BAD_REQUEST => "invalid_argument",
            _ => "internal",
        };
        let body = ErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Why the gate refused a call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GateError {
    /// The call carried neither credential header.
    #[error("missing credentials")]
    MissingCredentials,

    /// A credential header is not valid UTF-8.
    #[error("malformed {header} header")]
    MalformedCredentials { header: &'static str },

    /// Registration needs both a login and a password.
    #[error("empty credentials can't be registered")]
    EmptyCredentials,

    /// The store refused the credentials or failed.
    #[error(transparent)]
    Rejected(#[from] crate::Error),

    /// A handler asked for the caller's identity on a call that has none.
    #[error("can't get gamer's ID from context")]
    MissingIdentity,
}

impl GateError {
    /// Whether the caller is told its credentials were not accepted.
    ///
    /// Domain errors count as unauthenticated even on registration, where
    /// the credentials were never checked against an account.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            GateError::MissingCredentials
            | GateError::MalformedCredentials { .. }
            | GateError::EmptyCredentials => true,
            GateError::Rejected(err) => err.is_domain_error(),
            GateError::MissingIdentity => false,
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        if self.is_unauthenticated() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.is_unauthenticated() {
            tracing::error!(error = %self, "gate failure");
        }
        ErrorBody::response(status, self.to_string())
    }
}
