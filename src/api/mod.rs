//! HTTP listener receiving the OAuth redirect

mod handlers;
mod routes;

pub use handlers::{CallbackParams, HealthResponse, AUTHORIZED_PAGE};
pub use routes::{create_router, spawn_callback_server};
