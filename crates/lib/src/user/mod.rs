//! Users of the identity directory
//!
//! Data types shared by every store and the domain errors a store reports
//! when credentials do not match or a login is taken.

pub mod errors;
pub mod types;

pub use errors::UserError;
pub use types::*;
