//! MCP server implementation

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListResourcesResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam,
    ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;

use super::resources::{report_resources, ReportResource, ReportUri};
use super::tools::{ToolCall, WegeneTool};
use crate::context::AppContext;
use crate::tools::{oauth, profile, report, ToolOutput};

const INSTRUCTIONS: &str = "A WeGene account can hold several profiles (检测报告); each profile is one person's genetic test and has many phenotype reports (检测结果). \
First call wegene-oauth to authorize the account. \
Then call wegene-get-profiles to list the profiles; the resource list is rebuilt from them. \
Then call wegene-get-report-info for report IDs, categories and endpoints. \
Finally call wegene-get-report, or read a wegene://{report_endpoint}/{report_id}/{profile_id} resource, to get a report as JSON.";

/// Outcome of a tool call as the gateway sees it
#[derive(Debug, Clone)]
pub struct ToolReply {
    pub output: ToolOutput,
    /// The profile list was replaced and clients should re-list resources
    pub profiles_changed: bool,
}

impl From<ToolOutput> for ToolReply {
    fn from(output: ToolOutput) -> Self {
        Self {
            output,
            profiles_changed: false,
        }
    }
}

/// MCP server for WeGene
#[derive(Clone)]
pub struct WegeneServer {
    ctx: Arc<AppContext>,
}

impl WegeneServer {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn tools(&self) -> Vec<Tool> {
        WegeneTool::ALL.iter().map(WegeneTool::definition).collect()
    }

    /// Resolve and run a tool by name
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<ToolReply, ErrorData> {
        let call = ToolCall::parse(name, arguments)?;
        self.dispatch(call).await
    }

    pub async fn dispatch(&self, call: ToolCall) -> Result<ToolReply, ErrorData> {
        tracing::debug!("Calling tool {}", call.tool().name());

        match call {
            ToolCall::Oauth => Ok(oauth::authorize(&self.ctx).await?.into()),
            ToolCall::GetProfiles => {
                let outcome = profile::get_profiles(&self.ctx).await?;
                let profiles_changed = match outcome.profiles {
                    Some(profiles) => {
                        tracing::info!("Loaded {} profiles", profiles.len());
                        self.ctx.replace_profiles(profiles).await;
                        true
                    }
                    None => false,
                };
                Ok(ToolReply {
                    output: outcome.output,
                    profiles_changed,
                })
            }
            ToolCall::GetReportInfo => Ok(report::report_info(&self.ctx)?.into()),
            ToolCall::GetReport(params) => Ok(report::get_report(&self.ctx, &params).await?.into()),
        }
    }

    /// Current profiles crossed with the catalog, computed fresh on every call
    pub async fn resources(&self) -> Vec<ReportResource> {
        let profiles = self.ctx.profiles().await;
        report_resources(&profiles, &self.ctx.catalog)
    }

    /// Read a `wegene://` resource; same request as wegene-get-report
    pub async fn read_report(&self, uri: &str) -> Result<String, ErrorData> {
        let params = ReportUri::parse(uri)?.into_params();

        report::fetch_report(&self.ctx, &params).await.map_err(|err| {
            match report::failure_text(&err) {
                Some(text) => ErrorData::invalid_request(text, None),
                None => err.into(),
            }
        })
    }
}

impl ServerHandler for WegeneServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_resources_list_changed()
                .build(),
            server_info: Implementation {
                name: "wegene-assistant".into(),
                title: Some("WeGene Assistant".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let reply = self.call(&request.name, request.arguments).await?;

        if reply.profiles_changed {
            if let Err(e) = context.peer.notify_resource_list_changed().await {
                tracing::warn!("Failed to send resource list change: {}", e);
            }
        }

        Ok(reply.output.into_call_result())
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self
            .resources()
            .await
            .into_iter()
            .map(ReportResource::into_resource)
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let text = self.read_report(&request.uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}

/// Run the MCP server on stdio
pub async fn serve_stdio(server: WegeneServer) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server on stdio...");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Run the MCP server on HTTP
pub async fn serve_http(server: WegeneServer, port: u16) -> anyhow::Result<()> {
    use axum::routing::get;
    use axum::Router;
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    };
    use tokio_util::sync::CancellationToken;

    let ctx = server.context().clone();
    let ct = CancellationToken::new();

    let config = StreamableHttpServerConfig {
        cancellation_token: ct.clone(),
        ..Default::default()
    };

    let mcp_service = StreamableHttpService::new(
        move || Ok(WegeneServer::new(ctx.clone())),
        Arc::new(LocalSessionManager::default()),
        config,
    );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp_service);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("WeGene MCP server running at http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down...");
            ct.cancel();
        })
        .await?;

    Ok(())
}
