//! Domain errors for the identity directory
use thiserror::Error;

/// Outcomes a client can act on: the credentials were wrong or a login is taken.
///
/// These are reported to callers as authentication failures. The login is kept
/// for logs and for callers that want it, but is left out of the message so the
/// text is stable across clients.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("wrong login")]
    UnknownLogin { login: String },

    #[error("wrong password")]
    WrongPassword { login: String },

    #[error("login occupied")]
    LoginOccupied { login: String },
}

impl UserError {
    /// Check if this error reports a login that does not exist.
    pub fn is_unknown_login(&self) -> bool {
        matches!(self, UserError::UnknownLogin { .. })
    }

    /// Check if this error reports a password mismatch.
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, UserError::WrongPassword { .. })
    }

    /// Check if this error reports a login that is already taken.
    pub fn is_login_occupied(&self) -> bool {
        matches!(self, UserError::LoginOccupied { .. })
    }

    /// Get the login this error is about.
    pub fn login(&self) -> &str {
        match self {
            UserError::UnknownLogin { login }
            | UserError::WrongPassword { login }
            | UserError::LoginOccupied { login } => login,
        }
    }
}

// Conversion from UserError to the main Error type
impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
