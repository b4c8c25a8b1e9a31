//! wegene-get-report and wegene-get-report-info

use super::{missing_token_text, ToolOutput};
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::types::GetReportParams;

/// Fetch a report's raw JSON.
///
/// Shared by the wegene-get-report tool and `wegene://` resource reads. The
/// payload schema belongs to WeGene, so the body is passed through unparsed.
pub async fn fetch_report(ctx: &AppContext, params: &GetReportParams) -> Result<String> {
    let token = ctx.tokens.get_token()?.ok_or(Error::MissingToken)?;

    ctx.client
        .get_report(
            &token,
            &params.report_endpoint,
            &params.report_id,
            &params.profile_id,
        )
        .await
}

/// Agent-facing text for errors the agent can recover from
pub fn failure_text(err: &Error) -> Option<String> {
    match err {
        Error::MissingToken => Some(missing_token_text()),
        Error::Upstream { status, body } => Some(format!(
            "Error: Failed to retrieve report: {} {}",
            status, body
        )),
        _ => None,
    }
}

pub async fn get_report(ctx: &AppContext, params: &GetReportParams) -> Result<ToolOutput> {
    match fetch_report(ctx, params).await {
        Ok(body) => Ok(ToolOutput::Success(body)),
        Err(err) => match failure_text(&err) {
            Some(text) => Ok(ToolOutput::Failure(text)),
            None => Err(err),
        },
    }
}

/// The curated catalog as JSON text
pub fn report_info(ctx: &AppContext) -> Result<ToolOutput> {
    Ok(ToolOutput::Success(ctx.catalog.to_json()?))
}
