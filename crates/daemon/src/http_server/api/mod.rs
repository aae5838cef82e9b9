use axum::routing::{get, post};
use axum::Router;

pub mod base;
pub mod delete;
mod envelope;
pub mod login;
pub mod mkdir;
pub mod query;
mod session;
pub mod upload;

pub use envelope::{
    ApiError, Envelope, CODE_DISABLED, CODE_FAILED, CODE_OK, CODE_UNAUTHORIZED,
};
pub use session::RequireSession;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/setCookie", get(login::handler))
        .route("/base", get(base::handler))
        .route("/query", get(query::handler))
        .route("/upload", post(upload::handler))
        .route("/delete", get(delete::handler))
        .route("/createDir", get(mkdir::handler))
        .with_state(state)
}
