//! Authentication gate for incoming calls.
//!
//! [`authenticate`] is axum middleware that reads the caller's credentials
//! from the `login` and `password` headers and checks them against the
//! [`Directory`] before the call reaches its handler:
//!
//! - On the registration call (a path ending in `RegisterUser`) the
//!   credentials are registered instead and the call proceeds without an
//!   identity.
//! - On every other call they are authorized and the resulting [`Identity`]
//!   is attached to that request only. Handlers take it as an extractor.
//!
//! Install it with
//! `axum::middleware::from_fn_with_state(Gate::new(directory), authenticate)`.

pub mod errors;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use handle_trait::Handle;
use serde::{Deserialize, Serialize};

pub use errors::{ErrorBody, GateError};

use crate::{
    Directory,
    constants::{LOGIN_HEADER, PASSWORD_HEADER, REGISTER_METHOD},
    user::{Requisites, UserId},
};

/// The authenticated caller of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub login: String,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(GateError::MissingIdentity)
    }
}

/// State of the [`authenticate`] middleware.
#[derive(Clone, Handle)]
pub struct Gate {
    directory: Directory,
}

impl Gate {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// Decide whether a call to `path` with these headers may proceed.
    ///
    /// Returns the caller's identity, or `None` for a successful
    /// registration.
    pub async fn admit(&self, path: &str, headers: &HeaderMap) -> Result<Option<Identity>, GateError> {
        let requisites = credentials(headers)?;

        if is_registration(path) {
            if requisites.login.is_empty() || requisites.password.is_empty() {
                return Err(GateError::EmptyCredentials);
            }
            self.directory.register(&requisites).await?;
            return Ok(None);
        }

        let id = self.directory.authorize(&requisites).await?;
        Ok(Some(Identity {
            id,
            login: requisites.login,
        }))
    }
}

/// Middleware authorizing every call, see the module documentation.
pub async fn authenticate(
    State(gate): State<Gate>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let path = request.uri().path().to_owned();
    if let Some(identity) = gate.admit(&path, request.headers()).await? {
        request.extensions_mut().insert(identity);
    }
    Ok(next.run(request).await)
}

/// Whether `path` names the registration call.
pub fn is_registration(path: &str) -> bool {
    path.ends_with(REGISTER_METHOD)
}

/// Read the caller's requisites from the credential headers.
///
/// Repeated header values are concatenated in order. A header that is
/// absent reads as empty, but at least one of the two must be present.
pub fn credentials(headers: &HeaderMap) -> Result<Requisites, GateError> {
    let login = header_value(headers, LOGIN_HEADER)?;
    let password = header_value(headers, PASSWORD_HEADER)?;
    if login.is_none() && password.is_none() {
        return Err(GateError::MissingCredentials);
    }
    Ok(Requisites::new(
        login.unwrap_or_default(),
        password.unwrap_or_default(),
    ))
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, GateError> {
    let mut values = headers.get_all(name).iter().peekable();
    if values.peek().is_none() {
        return Ok(None);
    }
    let mut joined = String::new();
    for value in values {
        let text = std::str::from_utf8(value.as_bytes())
            .map_err(|_| GateError::MalformedCredentials { header: name })?;
        joined.push_str(text);
    }
    Ok(Some(joined))
}
