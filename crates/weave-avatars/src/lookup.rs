//! Remote identity lookup
//!
//! A remote roster entry is a login on an external identity service. The
//! service is asked for the user's avatar URL, then the image is downloaded.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::AvatarError;

/// Default GitHub REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("weave/", env!("CARGO_PKG_VERSION"));

/// Resolves logins to avatar images
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Avatar URL for a login, or `None` if the service has no such user
    async fn avatar_url(&self, login: &str) -> Result<Option<String>, AvatarError>;

    /// Download raw image bytes
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, AvatarError>;
}

/// Fields of the user resource that matter here
#[derive(Debug, Deserialize)]
struct GithubUser {
    avatar_url: Option<String>,
}

/// [`IdentityLookup`] backed by the GitHub users API
pub struct GithubLookup {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubLookup {
    /// Create a lookup client.
    ///
    /// Without a token the API still answers, at a much lower rate limit.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self, AvatarError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn user_url(&self, login: &str) -> String {
        format!("{}/users/{}", self.api_base, login)
    }
}

#[async_trait]
impl IdentityLookup for GithubLookup {
    async fn avatar_url(&self, login: &str) -> Result<Option<String>, AvatarError> {
        let mut req = self
            .client
            .get(self.user_url(login))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(login, "No such user");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AvatarError::Http(format!("lookup of {login} failed ({status}): {body}")));
        }

        let body = response.bytes().await?;
        let user: GithubUser =
            serde_json::from_slice(&body).map_err(|e| AvatarError::Lookup(e.to_string()))?;
        Ok(user.avatar_url)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, AvatarError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}
