//! wegene-oauth: browser authorization with token store polling

use std::time::Duration;
use tracing::{info, warn};

use super::ToolOutput;
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::store::TokenStore;

pub const AUTHORIZED_TEXT: &str =
    "User authorization succeeded and access token retrieved. Continue to retrieve user profiles.";

/// Start a fresh authorization and wait for the callback to store a token
pub async fn authorize(ctx: &AppContext) -> Result<ToolOutput> {
    ctx.tokens.delete_token()?;

    let url = ctx
        .client
        .authorization_url(&ctx.config.client_id, &ctx.config.redirect_uri());

    info!("Opening WeGene authorization page");
    if let Err(e) = ctx.browser.open(&url) {
        warn!("Could not open browser ({}), visit manually: {}", e, url);
    }

    let timeout = ctx.config.auth_timeout;
    if wait_for_token(&ctx.tokens, timeout, ctx.config.poll_interval).await? {
        info!("Access token received");
        Ok(ToolOutput::Success(AUTHORIZED_TEXT.to_string()))
    } else {
        warn!("Authorization not completed within {}s", timeout.as_secs());
        Ok(ToolOutput::Failure(format!(
            "Error: User authorization failed in {} seconds. Please try again.",
            timeout.as_secs()
        )))
    }
}

/// Check the store every `interval` until a token shows up or `timeout` passes.
///
/// Returns `false` on timeout. The wait yields to the runtime between checks.
pub async fn wait_for_token(
    tokens: &TokenStore,
    timeout: Duration,
    interval: Duration,
) -> Result<bool> {
    let poll = async {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if tokens.has_token()? {
                return Ok::<(), Error>(());
            }
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result.map(|()| true),
        Err(_) => Ok(false),
    }
}
