//! OAuth callback request handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::Error;
use crate::store::TOKEN_TTL;

pub const AUTHORIZED_PAGE: &str = "Authorization successful! You can now close this window.";

// Query parameters

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code issued by WeGene
    pub code: Option<String>,
    /// Set by WeGene when the user denied access
    pub error: Option<String>,
}

// Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Server version
    pub version: String,
}

type HandlerError = (StatusCode, String);

fn internal(err: Error) -> HandlerError {
    tracing::error!("OAuth callback failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Exchange the authorization code and store the access token
pub async fn oauth_callback(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<CallbackParams>,
) -> Result<&'static str, HandlerError> {
    let code = match params.code.filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => {
            let reason = params.error.unwrap_or_else(|| "missing authorization code".into());
            tracing::warn!("OAuth callback without code: {}", reason);
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Authorization failed: {}", reason),
            ));
        }
    };

    let token = ctx
        .client
        .exchange_code(
            &code,
            &ctx.config.client_id,
            &ctx.config.client_secret,
            &ctx.config.redirect_uri(),
        )
        .await
        .map_err(internal)?;

    ctx.tokens
        .set_token(&token.access_token, TOKEN_TTL)
        .map_err(internal)?;

    tracing::info!("Stored new WeGene access token");
    Ok(AUTHORIZED_PAGE)
}
