//! Tool table exposed to the agent

use rmcp::model::{JsonObject, Tool};
use rmcp::ErrorData;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::types::GetReportParams;

/// The four tools, by their protocol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WegeneTool {
    Oauth,
    GetProfiles,
    GetReportInfo,
    GetReport,
}

impl WegeneTool {
    pub const ALL: [WegeneTool; 4] = [
        WegeneTool::Oauth,
        WegeneTool::GetProfiles,
        WegeneTool::GetReportInfo,
        WegeneTool::GetReport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WegeneTool::Oauth => "wegene-oauth",
            WegeneTool::GetProfiles => "wegene-get-profiles",
            WegeneTool::GetReportInfo => "wegene-get-report-info",
            WegeneTool::GetReport => "wegene-get-report",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            WegeneTool::Oauth => "Authorizing a user's account using WeGene Open API with oAuth2 protocol and retrieve a valid access token for further use. Waits up to 120 seconds for the user to finish in the browser.",
            WegeneTool::GetProfiles => "Retrieve all the profiles under the current account. The resource list is rebuilt from the returned profiles.",
            WegeneTool::GetReportInfo => "Get all available report information, including report ID, category, name, gender applicability and endpoint",
            WegeneTool::GetReport => "Get a specific genetic test report from a profile. The result is the report JSON as returned by WeGene.",
        }
    }

    pub fn input_schema(&self) -> JsonObject {
        let schema = match self {
            WegeneTool::GetReport => report_params_schema(),
            _ => json!({ "type": "object", "properties": {} }),
        };

        match schema {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        }
    }

    pub fn definition(&self) -> Tool {
        Tool::new(self.name(), self.description(), Arc::new(self.input_schema()))
    }
}

fn report_params_schema() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(GetReportParams))
        .unwrap_or_else(|_| json!({ "type": "object" }));
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    schema
}

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Oauth,
    GetProfiles,
    GetReportInfo,
    GetReport(GetReportParams),
}

impl ToolCall {
    /// Resolve the tool and check its arguments. Fails before any tool runs.
    pub fn parse(name: &str, arguments: Option<JsonObject>) -> Result<Self, ErrorData> {
        let tool = WegeneTool::from_name(name)
            .ok_or_else(|| ErrorData::invalid_request(format!("Unknown tool: {}", name), None))?;

        Ok(match tool {
            WegeneTool::Oauth => ToolCall::Oauth,
            WegeneTool::GetProfiles => ToolCall::GetProfiles,
            WegeneTool::GetReportInfo => ToolCall::GetReportInfo,
            WegeneTool::GetReport => {
                let arguments = arguments
                    .filter(|args| !args.is_empty())
                    .ok_or_else(|| ErrorData::invalid_params("Missing arguments", None))?;
                let params: GetReportParams = serde_json::from_value(Value::Object(arguments))
                    .map_err(|e| {
                        ErrorData::invalid_params(format!("Missing arguments: {}", e), None)
                    })?;
                ToolCall::GetReport(params)
            }
        })
    }

    pub fn tool(&self) -> WegeneTool {
        match self {
            ToolCall::Oauth => WegeneTool::Oauth,
            ToolCall::GetProfiles => WegeneTool::GetProfiles,
            ToolCall::GetReportInfo => WegeneTool::GetReportInfo,
            ToolCall::GetReport(_) => WegeneTool::GetReport,
        }
    }
}
