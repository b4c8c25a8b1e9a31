//! Callback listener routes

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::context::AppContext;
use crate::error::Result;

/// Router serving the OAuth redirect
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/oauth/callback", get(handlers::oauth_callback))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind the callback listener and serve it in the background for the rest
/// of the process. Binding errors are returned so startup can abort.
pub async fn spawn_callback_server(
    ctx: Arc<AppContext>,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let addr = format!("127.0.0.1:{}", ctx.config.callback_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let router = create_router(ctx);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("OAuth callback listener stopped: {}", e);
        }
    });

    tracing::info!("OAuth callback listening on http://{}/oauth/callback", local_addr);
    Ok((local_addr, handle))
}
