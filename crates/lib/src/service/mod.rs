//! Account routes of the game server.
//!
//! Everything under [`API_PREFIX`] runs behind the authentication gate;
//! `/health` does not.
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /health` | status, backend and user count |
//! | `POST /api/v0/RegisterUser` | registration happens in the gate; the handler acknowledges it |
//! | `POST /api/v0/RemoveUser` | removes the caller |
//! | `POST /api/v0/ChangeUserRequisites` | JSON body `{ "login", "password" }` replaces the caller's requisites |
//! | `GET /api/v0/WhoAmI` | the identity the gate attached |

pub mod errors;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware,
    routing::{get, post},
};
use handle_trait::Handle;
use serde::{Deserialize, Serialize};

pub use errors::ServiceError;

use crate::{
    Directory,
    backend::backend_label,
    constants::API_PREFIX,
    gate::{self, Gate, Identity},
    user::Requisites,
};

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub users: usize,
}

/// Empty acknowledgement returned by the account calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

/// Build the router serving the account calls against `directory`.
pub fn router(directory: Directory) -> Router {
    let gate = Gate::new(directory.handle());

    let accounts = Router::new()
        .route("/RegisterUser", post(register_user))
        .route("/RemoveUser", post(remove_user))
        .route("/ChangeUserRequisites", post(change_user_requisites))
        .route("/WhoAmI", get(who_am_i))
        .route_layer(middleware::from_fn_with_state(gate, gate::authenticate));

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, accounts)
        .with_state(directory)
}

async fn health(State(directory): State<Directory>) -> Result<Json<HealthResponse>, ServiceError> {
    let users = directory.count().await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        backend: backend_label(directory.store().as_ref()).to_string(),
        users,
    }))
}

/// The gate has already registered the caller by the time this runs.
async fn register_user(headers: HeaderMap) -> Json<Ack> {
    if let Ok(requisites) = gate::credentials(&headers) {
        tracing::info!(login = %requisites.login, "registration acknowledged");
    }
    Json(Ack {})
}

async fn remove_user(
    State(directory): State<Directory>,
    identity: Identity,
    headers: HeaderMap,
) -> Result<Json<Ack>, ServiceError> {
    let requisites = caller_requisites(&headers)?;
    directory
        .remove(&requisites)
        .await
        .map_err(|source| ServiceError::RemoveFailed {
            login: requisites.login.clone(),
            id: identity.id,
            source,
        })?;
    Ok(Json(Ack {}))
}

async fn change_user_requisites(
    State(directory): State<Directory>,
    identity: Identity,
    headers: HeaderMap,
    Json(new): Json<Requisites>,
) -> Result<Json<Ack>, ServiceError> {
    let old = caller_requisites(&headers)?;
    require_non_empty(&new)?;
    directory
        .change_requisites(&old, &new)
        .await
        .map_err(|source| ServiceError::ChangeFailed {
            login: old.login.clone(),
            new_login: new.login.clone(),
            id: identity.id,
            source,
        })?;
    Ok(Json(Ack {}))
}

async fn who_am_i(identity: Identity) -> Json<Identity> {
    Json(identity)
}

/// The requisites the gate accepted, re-read for the store call.
fn caller_requisites(headers: &HeaderMap) -> Result<Requisites, ServiceError> {
    let requisites = gate::credentials(headers).map_err(|_| ServiceError::EmptyLogin)?;
    require_non_empty(&requisites)?;
    Ok(requisites)
}

fn require_non_empty(requisites: &Requisites) -> Result<(), ServiceError> {
    if requisites.login.is_empty() {
        return Err(ServiceError::EmptyLogin);
    }
    if requisites.password.is_empty() {
        return Err(ServiceError::EmptyPassword);
    }
    Ok(())
}
