use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::github::rate_limiter::RateLimitSnapshot;
use crate::github::source::{RepoPage, RepositorySource};
use crate::models::{RepoDetails, RepoSummary};

const DEFAULT_BASE_URL: &str = "https://api.github.com";

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    content: Option<String>,
}

impl GitHubClient {
    /// Builds a client against api.github.com. Without a token requests are
    /// unauthenticated and subject to much lower rate limits.
    pub fn new(token: Option<&str>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: Option<&str>, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
            tracing::info!("Using authenticated GitHub access");
        } else {
            tracing::warn!("Using unauthenticated GitHub access (lower rate limits)");
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("repo-invest/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn api_error(response: Response, what: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Error::GitHubApi(format!("Failed to fetch {}: {} - {}", what, status, body))
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repos(&self, username: &str, page: u32, per_page: u32) -> Result<RepoPage> {
        let url = format!("{}/users/{}/repos", self.base_url, username);
        tracing::debug!("Fetching: {} (page {}, per_page {})", url, page, per_page);

        let response = self
            .client
            .get(&url)
            .query(&[("page", page), ("per_page", per_page)])
            .query(&[("sort", "updated"), ("direction", "desc")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::UserNotFound(username.to_string()));
        }

        if !response.status().is_success() {
            return Err(Self::api_error(response, &format!("repositories of {}", username)).await);
        }

        let rate_limit = RateLimitSnapshot::from_headers(response.headers());
        let items: Vec<RepoSummary> = response.json().await?;

        Ok(RepoPage { items, rate_limit })
    }

    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, owner, repo);
        tracing::debug!("Fetching readme: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::api_error(response, &format!("readme of {}/{}", owner, repo)).await);
        }

        let readme: ReadmeResponse = response.json().await?;
        Ok(readme.content)
    }

    async fn fetch_details(&self, owner: &str, repo: &str) -> Result<RepoDetails> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        tracing::debug!("Fetching details: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, &format!("details of {}/{}", owner, repo)).await);
        }

        Ok(response.json().await?)
    }
}
