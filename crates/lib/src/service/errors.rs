//! Error types for the account routes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gate::ErrorBody;
use crate::user::UserId;

/// Failures of the account calls themselves, after the gate let them in.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("empty login")]
    EmptyLogin,

    #[error("empty password")]
    EmptyPassword,

    #[error("can't remove user: user with login {login:?}, id {id}: {source}")]
    RemoveFailed {
        login: String,
        id: UserId,
        #[source]
        source: crate::Error,
    },

    #[error(
        "can't change user requisites: user with login {login:?}, id {id} (new login {new_login:?}): {source}"
    )]
    ChangeFailed {
        login: String,
        new_login: String,
        id: UserId,
        #[source]
        source: crate::Error,
    },

    #[error(transparent)]
    Store(#[from] crate::Error),
}

impl ServiceError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::EmptyLogin | ServiceError::EmptyPassword => StatusCode::BAD_REQUEST,
            ServiceError::RemoveFailed { source, .. }
            | ServiceError::ChangeFailed { source, .. }
            | ServiceError::Store(source) => {
                if source.is_domain_error() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "account call failed");
        }
        ErrorBody::response(status, self.to_string())
    }
}
