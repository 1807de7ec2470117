use async_trait::async_trait;

use crate::error::Result;
use crate::github::rate_limiter::RateLimitSnapshot;
use crate::models::{RepoDetails, RepoSummary};

/// One page of the repository listing.
#[derive(Debug, Clone, Default)]
pub struct RepoPage {
    pub items: Vec<RepoSummary>,
    pub rate_limit: Option<RateLimitSnapshot>,
}

/// The three GitHub endpoints the fetch pipeline depends on.
///
/// `list_repos` returns `Error::UserNotFound` when the account does not
/// exist. `fetch_readme` returns the raw base64 payload, or `None` when the
/// repository has no readme.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn list_repos(&self, username: &str, page: u32, per_page: u32) -> Result<RepoPage>;
    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>>;
    async fn fetch_details(&self, owner: &str, repo: &str) -> Result<RepoDetails>;
}
