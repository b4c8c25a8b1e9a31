//! Application context shared by the MCP handlers and the callback listener

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::ReportCatalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::TokenStore;
use crate::types::Profile;
use crate::wegene::WegeneClient;

/// Opens the authorization page for the user
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Launches the desktop's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| Error::Browser(e.to_string()))
    }
}

/// Everything a handler needs, built once at startup
pub struct AppContext {
    pub config: Config,
    pub tokens: Arc<TokenStore>,
    pub catalog: Arc<ReportCatalog>,
    pub client: WegeneClient,
    pub browser: Arc<dyn BrowserLauncher>,
    profiles: RwLock<Vec<Profile>>,
}

impl AppContext {
    pub fn new(
        config: Config,
        tokens: Arc<TokenStore>,
        catalog: Arc<ReportCatalog>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Result<Self> {
        let client = WegeneClient::new(&config.api_base_url)?;
        Ok(Self {
            config,
            tokens,
            catalog,
            client,
            browser,
            profiles: RwLock::new(Vec::new()),
        })
    }

    /// Open the token store and load the catalog named by `config`
    pub fn initialize(config: Config) -> Result<Self> {
        let tokens = Arc::new(TokenStore::open(&config.token_db_path)?);
        let catalog = Arc::new(ReportCatalog::load(&config.reports_path)?);
        Self::new(config, tokens, catalog, Arc::new(SystemBrowser))
    }

    /// Profiles of the currently authorized account
    pub async fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    /// Swap in a freshly fetched profile list; nothing from the old one survives
    pub async fn replace_profiles(&self, profiles: Vec<Profile>) {
        let mut current = self.profiles.write().await;
        *current = profiles;
    }
}
