//! Configuration for the WeGene assistant

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Scope requested from the WeGene authorization endpoint
pub const OAUTH_SCOPE: &str = "basic names athletigen skin psychology risk health";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client id issued by WeGene
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret issued by WeGene
    #[serde(default)]
    pub client_secret: String,

    /// SQLite file backing the token store
    #[serde(default = "default_token_db_path")]
    pub token_db_path: PathBuf,

    /// JSON report catalog
    #[serde(default = "default_reports_path")]
    pub reports_path: PathBuf,

    /// Local port for the OAuth redirect listener
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,

    /// WeGene Open API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// How long wegene-oauth waits for the user to finish in the browser
    #[serde(default = "default_auth_timeout", with = "duration_secs")]
    pub auth_timeout: Duration,

    /// Delay between token store checks while waiting
    #[serde(default = "default_poll_interval", with = "duration_secs")]
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_db_path: default_token_db_path(),
            reports_path: default_reports_path(),
            callback_port: default_callback_port(),
            api_base_url: default_api_base_url(),
            auth_timeout: default_auth_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Config {
    /// Build config from process environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(id) = lookup("WEGENE_CLIENT_ID") {
            config.client_id = id;
        }
        if let Some(secret) = lookup("WEGENE_CLIENT_SECRET") {
            config.client_secret = secret;
        }
        if let Some(path) = lookup("WEGENE_TOKEN_DB").or_else(|| lookup("REDIS_DB_PATH")) {
            config.token_db_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("WEGENE_REPORTS_PATH") {
            config.reports_path = PathBuf::from(path);
        }
        if let Some(port) = lookup("WEGENE_CALLBACK_PORT") {
            config.callback_port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("WEGENE_CALLBACK_PORT is not a port: {}", port)))?;
        }
        if let Some(base) = lookup("WEGENE_API_BASE") {
            config.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("WEGENE_AUTH_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("WEGENE_AUTH_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.auth_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Check that everything needed to talk to WeGene is present
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Config("WEGENE_CLIENT_ID is not set".into()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::Config("WEGENE_CLIENT_SECRET is not set".into()));
        }
        Ok(())
    }

    /// Redirect URI registered with WeGene, served by the callback listener
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/oauth/callback", self.callback_port)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

// Default value functions

fn default_token_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wegene-assistant")
        .join("token.db")
}

fn default_reports_path() -> PathBuf {
    PathBuf::from("config/reports.json")
}

fn default_callback_port() -> u16 {
    8787
}

fn default_api_base_url() -> String {
    "https://api.wegene.com".to_string()
}

fn default_auth_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}
