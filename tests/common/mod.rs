//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use wegene_assistant::catalog::ReportCatalog;
use wegene_assistant::config::Config;
use wegene_assistant::context::{AppContext, BrowserLauncher};
use wegene_assistant::mcp::WegeneServer;
use wegene_assistant::store::TokenStore;

pub const CATALOG: &str = r#"[
    {"category": "运动基因", "report_id": "1487", "report_name": "爆发力",
     "report_gender_category": "全部", "report_endpoint": "athletigen"},
    {"category": "健康风险", "report_id": "1530", "report_name": "前列腺癌",
     "report_gender_category": "男", "report_endpoint": "health/risk"},
    {"category": "健康风险", "report_id": "1531", "report_name": "乳腺癌",
     "report_gender_category": "女", "report_endpoint": "health/risk"}
]"#;

pub const TOKEN: &str = "test-access-token";

/// Remembers every URL it was asked to open
#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
}

impl RecordingBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl BrowserLauncher for RecordingBrowser {
    fn open(&self, url: &str) -> wegene_assistant::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Gateway wired to a throwaway token store and the given API base URL
pub struct GatewayFixture {
    _temp_dir: TempDir,
    pub ctx: Arc<AppContext>,
    pub server: WegeneServer,
    pub browser: Arc<RecordingBrowser>,
}

impl GatewayFixture {
    pub fn new(api_base_url: &str) -> Self {
        Self::with_config(api_base_url, |_| {})
    }

    pub fn with_config(api_base_url: &str, adjust: impl FnOnce(&mut Config)) -> Self {
        Self::with_browser(api_base_url, Arc::new(RecordingBrowser::default()), adjust)
    }

    pub fn with_browser(
        api_base_url: &str,
        browser: Arc<RecordingBrowser>,
        adjust: impl FnOnce(&mut Config),
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            token_db_path: temp_dir.path().join("token.db"),
            api_base_url: api_base_url.into(),
            poll_interval: Duration::from_secs(1),
            auth_timeout: Duration::from_secs(120),
            ..Config::default()
        };
        adjust(&mut config);

        let tokens = Arc::new(
            TokenStore::open(&config.token_db_path).expect("Failed to open token store"),
        );
        let catalog = Arc::new(ReportCatalog::from_json_str(CATALOG).expect("Bad test catalog"));

        let ctx = Arc::new(
            AppContext::new(config, tokens, catalog, browser.clone())
                .expect("Failed to build context"),
        );
        let server = WegeneServer::new(ctx.clone());

        Self {
            _temp_dir: temp_dir,
            ctx,
            server,
            browser,
        }
    }

    pub fn authorize(&self) {
        self.ctx
            .tokens
            .set_token(TOKEN, wegene_assistant::store::TOKEN_TTL)
            .expect("Failed to store token");
    }
}

pub fn args(value: serde_json::Value) -> Option<rmcp::model::JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}
