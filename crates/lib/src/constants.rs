//! Constants used throughout the yagogame library.
//!
//! Credential header names, the registration call name and the accounts a
//! fresh users file is seeded with.

/// Request metadata key carrying the login.
pub const LOGIN_HEADER: &str = "login";

/// Request metadata key carrying the password.
pub const PASSWORD_HEADER: &str = "password";

/// Name of the one call the gate lets through without an existing account.
pub const REGISTER_METHOD: &str = "RegisterUser";

/// Route prefix of the account calls.
pub const API_PREFIX: &str = "/api/v0";

/// Accounts written to a users file that does not exist yet: (login, password, id).
pub const DEFAULT_USERS: &[(&str, &str, i64)] = &[("Joe", "aaa", 1), ("Nick", "bbb", 2)];
