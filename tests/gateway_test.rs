//! Integration tests for the MCP gateway
//! Tools and resources run against a stubbed WeGene API

mod common;

use rmcp::model::{CallToolRequestParam, ErrorCode};
use rmcp::service::{NotificationContext, RunningService};
use rmcp::{ClientHandler, RoleClient, ServiceExt};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{args, GatewayFixture, TOKEN};
use wegene_assistant::mcp::WegeneServer;
use wegene_assistant::tools::ToolOutput;

const REPORT_BODY: &str = r#"{"score": 0.82, "rank": "high", "genotypes": [{"rsid": "rs1815739", "genotype": "CC"}]}"#;

fn user_body(profiles: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "profiles": profiles }))
}

async fn mount_profiles(mock: &MockServer, profiles: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/user/"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(user_body(profiles))
        .mount(mock)
        .await;
}

async fn assert_no_requests(mock: &MockServer) {
    let received = mock.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "unexpected upstream requests: {}", received.len());
}

// ============================================================================
// Tool listing
// ============================================================================

#[tokio::test]
async fn test_lists_four_tools() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");

    let names: Vec<String> = fixture
        .server
        .tools()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "wegene-oauth",
            "wegene-get-profiles",
            "wegene-get-report-info",
            "wegene-get-report"
        ]
    );
}

#[tokio::test]
async fn test_unknown_tool_is_protocol_error() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");

    let err = fixture.server.call("wegene-bogus", None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    assert_eq!(err.message, "Unknown tool: wegene-bogus");
}

// ============================================================================
// Missing token
// ============================================================================

#[tokio::test]
async fn test_get_profiles_without_token_makes_no_request() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());

    let reply = fixture.server.call("wegene-get-profiles", None).await.unwrap();

    assert_eq!(
        reply.output,
        ToolOutput::Failure(
            "Error: No valid user access token. Please use wegene-oauth tool first.".into()
        )
    );
    assert!(!reply.profiles_changed);
    assert_no_requests(&mock).await;
}

#[tokio::test]
async fn test_get_report_without_token_makes_no_request() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());

    let reply = fixture
        .server
        .call(
            "wegene-get-report",
            args(json!({
                "report_endpoint": "athletigen",
                "report_id": "1487",
                "profile_id": "p1"
            })),
        )
        .await
        .unwrap();

    assert!(!reply.output.is_success());
    assert!(reply.output.text().contains("Please use wegene-oauth tool first"));
    assert_no_requests(&mock).await;
}

#[tokio::test]
async fn test_resource_read_without_token_fails_with_guidance() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());

    let err = fixture
        .server
        .read_report("wegene://athletigen/1487/p1")
        .await
        .unwrap_err();

    assert!(err.message.contains("Please use wegene-oauth tool first"));
    assert_no_requests(&mock).await;
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn test_get_profiles_summarizes_and_stores_profiles() {
    let mock = MockServer::start().await;
    mount_profiles(
        &mock,
        json!([
            {"name": "Alice", "sex": 2, "id": "p1"},
            {"name": "Bob", "sex": "1", "id": "p2"}
        ]),
    )
    .await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    let reply = fixture.server.call("wegene-get-profiles", None).await.unwrap();

    assert!(reply.output.is_success());
    assert_eq!(
        reply.output.text(),
        "Successfully retrieved 2 profiles(s):\nProfile 1: ID=p1, Name=Alice\nProfile 2: ID=p2, Name=Bob"
    );
    assert!(reply.profiles_changed);

    let profiles = fixture.ctx.profiles().await;
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].gender, "2");
    assert_eq!(profiles[1].profile_id, "p2");
}

#[tokio::test]
async fn test_refetching_profiles_replaces_previous_list() {
    let mock = MockServer::start().await;
    mount_profiles(&mock, json!([{"name": "A", "sex": 1, "id": "a"}])).await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    fixture.server.call("wegene-get-profiles", None).await.unwrap();
    assert!(fixture
        .server
        .resources()
        .await
        .iter()
        .any(|r| r.uri.to_string().ends_with("/a")));

    mock.reset().await;
    mount_profiles(
        &mock,
        json!([
            {"name": "B", "sex": 1, "id": "b"},
            {"name": "C", "sex": 2, "id": "c"}
        ]),
    )
    .await;

    fixture.server.call("wegene-get-profiles", None).await.unwrap();

    let resources = fixture.server.resources().await;
    assert!(!resources.iter().any(|r| r.uri.to_string().ends_with("/a")));
    assert!(resources.iter().any(|r| r.uri.to_string().ends_with("/b")));
    assert!(resources.iter().any(|r| r.uri.to_string().ends_with("/c")));
}

#[tokio::test]
async fn test_empty_profile_list_clears_resources() {
    let mock = MockServer::start().await;
    mount_profiles(&mock, json!([{"name": "A", "sex": 1, "id": "a"}])).await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();
    fixture.server.call("wegene-get-profiles", None).await.unwrap();
    assert!(!fixture.server.resources().await.is_empty());

    mock.reset().await;
    mount_profiles(&mock, json!([])).await;

    let reply = fixture.server.call("wegene-get-profiles", None).await.unwrap();
    assert!(reply.profiles_changed);
    assert!(fixture.server.resources().await.is_empty());
}

#[tokio::test]
async fn test_profile_fetch_rejected_keeps_previous_profiles() {
    let mock = MockServer::start().await;
    mount_profiles(&mock, json!([{"name": "A", "sex": 1, "id": "a"}])).await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();
    fixture.server.call("wegene-get-profiles", None).await.unwrap();

    mock.reset().await;
    Mock::given(method("GET"))
        .and(path("/user/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
        .mount(&mock)
        .await;

    let reply = fixture.server.call("wegene-get-profiles", None).await.unwrap();

    assert_eq!(
        reply.output,
        ToolOutput::Failure("Error: Failed to get profile: 401 invalid_token".into())
    );
    assert!(!reply.profiles_changed);
    assert_eq!(fixture.ctx.profiles().await.len(), 1);
}

// ============================================================================
// Resources
// ============================================================================

#[tokio::test]
async fn test_resources_follow_gender_applicability() {
    let mock = MockServer::start().await;
    mount_profiles(
        &mock,
        json!([
            {"name": "Male", "sex": 1, "id": "m"},
            {"name": "Female", "sex": 2, "id": "f"},
            {"name": "Unknown", "sex": 0, "id": "u"}
        ]),
    )
    .await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();
    fixture.server.call("wegene-get-profiles", None).await.unwrap();

    let uris: Vec<String> = fixture
        .server
        .resources()
        .await
        .into_iter()
        .map(|r| r.uri.to_string())
        .collect();

    assert_eq!(
        uris,
        vec![
            "wegene://athletigen/1487/m",
            "wegene://health/risk/1530/m",
            "wegene://athletigen/1487/f",
            "wegene://health/risk/1531/f",
            "wegene://athletigen/1487/u",
            "wegene://health/risk/1530/u",
            "wegene://health/risk/1531/u",
        ]
    );
}

#[tokio::test]
async fn test_no_resources_before_profiles_are_fetched() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");
    assert!(fixture.server.resources().await.is_empty());
}

#[tokio::test]
async fn test_resource_read_matches_tool_output() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/health/risk/p1"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_json(json!({"report_id": "1530"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_BODY))
        .expect(2)
        .mount(&mock)
        .await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    let reply = fixture
        .server
        .call(
            "wegene-get-report",
            args(json!({
                "report_endpoint": "health/risk",
                "report_id": "1530",
                "profile_id": "p1"
            })),
        )
        .await
        .unwrap();
    let text = fixture
        .server
        .read_report("wegene://health/risk/1530/p1")
        .await
        .unwrap();

    assert_eq!(reply.output, ToolOutput::Success(REPORT_BODY.into()));
    assert_eq!(text, REPORT_BODY);
}

#[tokio::test]
async fn test_resource_read_rejects_other_schemes() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    let err = fixture
        .server
        .read_report("https://example.com/a/b/c")
        .await
        .unwrap_err();
    assert!(err.message.contains("Unsupported URI scheme"));

    let err = fixture
        .server
        .read_report("wegene://athletigen/1487")
        .await
        .unwrap_err();
    assert!(err.message.contains("Invalid URL schema"));

    assert_no_requests(&mock).await;
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_get_report_upstream_error_is_reported_to_agent() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/athletigen/p1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server exploded"))
        .mount(&mock)
        .await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    let reply = fixture
        .server
        .call(
            "wegene-get-report",
            args(json!({
                "report_endpoint": "athletigen",
                "report_id": "1487",
                "profile_id": "p1"
            })),
        )
        .await
        .unwrap();

    assert_eq!(
        reply.output,
        ToolOutput::Failure("Error: Failed to retrieve report: 500 server exploded".into())
    );
}

#[tokio::test]
async fn test_get_report_missing_argument_makes_no_request() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();

    let result = fixture
        .server
        .call(
            "wegene-get-report",
            args(json!({"report_endpoint": "athletigen", "report_id": "1487"})),
        )
        .await;
    assert!(result.is_err());

    let result = fixture.server.call("wegene-get-report", None).await;
    assert!(result.is_err());

    assert_no_requests(&mock).await;
}

#[tokio::test]
async fn test_report_info_returns_catalog() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");

    let reply = fixture.server.call("wegene-get-report-info", None).await.unwrap();
    assert!(reply.output.is_success());

    let catalog: serde_json::Value = serde_json::from_str(reply.output.text()).unwrap();
    let entries = catalog.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["report_id"], "1530");
    assert_eq!(entries[1]["report_gender_category"], "男");
}

// ============================================================================
// OAuth
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_oauth_opens_authorization_page_and_waits() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");

    let tokens = fixture.ctx.tokens.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        tokens
            .set_token("fresh", wegene_assistant::store::TOKEN_TTL)
            .unwrap();
    });

    let reply = fixture.server.call("wegene-oauth", None).await.unwrap();

    assert_eq!(
        reply.output,
        ToolOutput::Success(wegene_assistant::tools::oauth::AUTHORIZED_TEXT.into())
    );

    let opened = fixture.browser.opened();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].starts_with("http://127.0.0.1:9/authorize/?response_type=code"));
    assert!(opened[0].contains("client_id=test-client"));
}

#[tokio::test(start_paused = true)]
async fn test_oauth_discards_old_token_and_times_out() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");
    fixture.authorize();

    let reply = fixture.server.call("wegene-oauth", None).await.unwrap();

    assert_eq!(
        reply.output,
        ToolOutput::Failure(
            "Error: User authorization failed in 120 seconds. Please try again.".into()
        )
    );
    assert!(!fixture.ctx.tokens.has_token().unwrap());
}

// ============================================================================
// Notifications over a live MCP session
// ============================================================================

/// MCP client counting resource list change notifications
#[derive(Clone, Default)]
struct ListChangedCounter {
    count: Arc<AtomicUsize>,
}

impl ListChangedCounter {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ClientHandler for ListChangedCounter {
    async fn on_resource_list_changed(&self, _context: NotificationContext<RoleClient>) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serve the gateway over an in-memory pipe and connect a counting client
async fn connect(
    server: WegeneServer,
) -> (RunningService<RoleClient, ListChangedCounter>, ListChangedCounter) {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);

    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_io).await {
            let _ = running.waiting().await;
        }
    });

    let counter = ListChangedCounter::default();
    let client = counter
        .clone()
        .serve(client_io)
        .await
        .expect("Failed to connect MCP client");
    (client, counter)
}

fn tool_request(name: &str) -> CallToolRequestParam {
    serde_json::from_value(json!({ "name": name })).expect("Bad tool request")
}

/// Let in-flight notifications reach the client handler
async fn settle(counter: &ListChangedCounter, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while counter.count() < expected && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_profile_refresh_notifies_resource_list_changed() {
    let mock = MockServer::start().await;
    mount_profiles(&mock, json!([{"name": "A", "sex": 1, "id": "a"}])).await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();
    let (client, counter) = connect(fixture.server.clone()).await;

    let result = client
        .call_tool(tool_request("wegene-get-profiles"))
        .await
        .unwrap();
    assert_ne!(result.is_error, Some(true));

    settle(&counter, 1).await;
    assert_eq!(counter.count(), 1);

    let resources = client.list_all_resources().await.unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].raw.uri, "wegene://athletigen/1487/a");

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_rejected_profile_fetch_sends_no_notification() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
        .mount(&mock)
        .await;

    let fixture = GatewayFixture::new(&mock.uri());
    fixture.authorize();
    let (client, counter) = connect(fixture.server.clone()).await;

    let result = client
        .call_tool(tool_request("wegene-get-profiles"))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));

    client.list_all_resources().await.unwrap();
    settle(&counter, 0).await;
    assert_eq!(counter.count(), 0);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_profiles_without_token_send_no_notification() {
    let mock = MockServer::start().await;
    let fixture = GatewayFixture::new(&mock.uri());
    let (client, counter) = connect(fixture.server.clone()).await;

    let result = client
        .call_tool(tool_request("wegene-get-profiles"))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));

    let resources = client.list_all_resources().await.unwrap();
    assert!(resources.is_empty());
    settle(&counter, 0).await;
    assert_eq!(counter.count(), 0);
    assert_no_requests(&mock).await;

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_unknown_tool_over_session_is_protocol_error() {
    let fixture = GatewayFixture::new("http://127.0.0.1:9");
    let (client, _counter) = connect(fixture.server.clone()).await;

    let err = client
        .call_tool(tool_request("wegene-bogus"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown tool: wegene-bogus"));

    client.cancel().await.unwrap();
}
