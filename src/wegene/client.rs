//! HTTP client for the WeGene Open API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::OAUTH_SCOPE;
use crate::error::{Error, Result};
use crate::types::Profile;

/// Timeout for a single WeGene request
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// OAuth token response from WeGene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Body of `GET /user/`
#[derive(Debug, Deserialize)]
struct UserResponse {
    profiles: Vec<RawProfile>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    name: String,
    sex: Value,
    id: Value,
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        Profile {
            name: raw.name,
            gender: value_to_string(&raw.sex),
            profile_id: value_to_string(&raw.id),
        }
    }
}

/// Numbers and strings both show up for ids and sex codes
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    report_id: &'a str,
}

/// Thin wrapper over the WeGene REST endpoints
#[derive(Debug, Clone)]
pub struct WegeneClient {
    http: reqwest::Client,
    base_url: String,
}

impl WegeneClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL the user has to visit to grant access
    pub fn authorization_url(&self, client_id: &str, redirect_uri: &str) -> String {
        format!(
            "{}/authorize/?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.base_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPE),
        )
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse> {
        debug!("Exchanging authorization code at {}/token/", self.base_url);

        let response = self
            .http
            .post(format!("{}/token/", self.base_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("scope", OAUTH_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::OAuth(format!(
                "token exchange failed: {} {}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::OAuth(format!("unexpected token response: {}", e)))
    }

    /// List the profiles under the authorized account
    pub async fn get_profiles(&self, access_token: &str) -> Result<Vec<Profile>> {
        debug!("Fetching profiles from {}/user/", self.base_url);

        let response = self
            .http
            .get(format!("{}/user/", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let user: UserResponse = response.json().await?;
        Ok(user.profiles.into_iter().map(Profile::from).collect())
    }

    /// Fetch one report for one profile. The body is returned untouched.
    pub async fn get_report(
        &self,
        access_token: &str,
        report_endpoint: &str,
        report_id: &str,
        profile_id: &str,
    ) -> Result<String> {
        let url = format!("{}/{}/{}", self.base_url, report_endpoint, profile_id);
        debug!("Fetching report {} from {}", report_id, url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&ReportRequest { report_id })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
