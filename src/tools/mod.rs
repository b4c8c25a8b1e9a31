//! Business logic behind the agent-facing tools
//!
//! Each tool returns a [`ToolOutput`]: recoverable problems (no token, an
//! upstream error status, an expired authorization window) are reported as
//! [`ToolOutput::Failure`] text the agent can act on. Only faults the agent
//! cannot fix by calling another tool come back as `Err`.

pub mod oauth;
pub mod profile;
pub mod report;

use rmcp::model::{CallToolResult, Content};

use crate::error::Error;

/// Text result of a tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Success(String),
    Failure(String),
}

impl ToolOutput {
    pub fn text(&self) -> &str {
        match self {
            ToolOutput::Success(text) | ToolOutput::Failure(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutput::Success(_))
    }

    pub fn into_call_result(self) -> CallToolResult {
        match self {
            ToolOutput::Success(text) => CallToolResult::success(vec![Content::text(text)]),
            ToolOutput::Failure(text) => CallToolResult::error(vec![Content::text(text)]),
        }
    }
}

pub(crate) fn missing_token_text() -> String {
    format!("Error: {}", Error::MissingToken)
}
