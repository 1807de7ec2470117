use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tokio::time::{sleep, Duration};

use crate::analysis::strategy::FetchPolicy;
use crate::error::Error;
use crate::github::enrichment::Enricher;
use crate::github::rate_limiter::RateLimitGovernor;
use crate::github::source::RepositorySource;
use crate::models::{RepoSummary, Repository};

pub const DEFAULT_PER_PAGE: u32 = 100;
/// Largest page the listing endpoint serves.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub per_page: u32,
    /// Pause after each accepted entry's enrichment.
    pub item_delay: Duration,
    /// Pause between listing pages.
    pub page_delay: Duration,
    /// Enrichment calls in flight per page. Output order is unaffected.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            item_delay: Duration::from_millis(500),
            page_delay: Duration::from_secs(1),
            concurrency: 1,
        }
    }
}

/// Why the listing walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTermination {
    EndOfListing,
    CapReached,
    UserNotFound,
    RequestFailed(String),
}

/// Result of a listing walk. Always carries whatever was collected, even
/// when the walk was cut short by a failed request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub repositories: Vec<Repository>,
    pub pages_requested: u32,
    pub termination: FetchTermination,
}

impl FetchOutcome {
    pub fn is_partial(&self) -> bool {
        matches!(
            self.termination,
            FetchTermination::UserNotFound | FetchTermination::RequestFailed(_)
        )
    }
}

/// Walks `/users/{user}/repos` most-recently-updated first, enriching each
/// accepted entry and stopping as early as the policy allows.
pub struct RepositoryFetcher {
    source: Arc<dyn RepositorySource>,
    governor: RateLimitGovernor,
    config: FetchConfig,
    progress: ProgressBar,
}

impl RepositoryFetcher {
    pub fn new(source: Arc<dyn RepositorySource>, config: FetchConfig) -> Self {
        Self {
            source,
            governor: RateLimitGovernor::new(),
            config,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn governor(&self) -> &RateLimitGovernor {
        &self.governor
    }

    pub async fn fetch(&self, username: &str, policy: &FetchPolicy) -> FetchOutcome {
        let cap = policy.budget.cap();
        let per_page = self.config.per_page.clamp(1, MAX_PER_PAGE);
        let mut repositories: Vec<Repository> = Vec::new();
        let mut pages_requested = 0;
        let mut page = 1;

        tracing::info!(
            "Fetching repositories for {} (budget {:?}, exclude_forks={}, min_stars={})",
            username,
            policy.budget,
            policy.filters.exclude_forks,
            policy.filters.min_stars
        );

        let termination = loop {
            if cap.is_some_and(|c| repositories.len() >= c) {
                break FetchTermination::CapReached;
            }

            self.governor.wait().await;
            pages_requested += 1;

            let listing = match self.source.list_repos(username, page, per_page).await {
                Ok(listing) => listing,
                Err(Error::UserNotFound(_)) => {
                    tracing::warn!("User not found: {}", username);
                    break FetchTermination::UserNotFound;
                }
                Err(e) => {
                    tracing::warn!("Listing page {} failed, keeping partial result: {}", page, e);
                    break FetchTermination::RequestFailed(e.to_string());
                }
            };

            if let Some(snapshot) = listing.rate_limit {
                self.governor.observe(snapshot).await;
            }

            let page_len = listing.items.len();
            if page_len == 0 {
                break FetchTermination::EndOfListing;
            }

            let room = cap.map_or(usize::MAX, |c| c - repositories.len());
            let accepted: Vec<RepoSummary> = listing
                .items
                .into_iter()
                .filter(|s| policy.filters.accepts(s.fork, s.stargazers_count))
                .take(room)
                .collect();

            tracing::debug!(
                "Page {}: {} entries, {} accepted",
                page,
                page_len,
                accepted.len()
            );
            repositories.extend(self.enrich_all(username, accepted).await);

            if cap.is_some_and(|c| repositories.len() >= c) {
                break FetchTermination::CapReached;
            }
            if page_len < per_page as usize {
                break FetchTermination::EndOfListing;
            }

            page += 1;
            sleep(self.config.page_delay).await;
        };

        self.progress.finish_and_clear();
        log_summary(&repositories, pages_requested);

        FetchOutcome {
            repositories,
            pages_requested,
            termination,
        }
    }

    async fn enrich_all(&self, owner: &str, accepted: Vec<RepoSummary>) -> Vec<Repository> {
        let enricher = Enricher::new(self.source.as_ref());
        let enricher = &enricher;

        stream::iter(accepted)
            .map(|summary| async move {
                let enrichment = enricher.enrich(owner, &summary.name).await;
                let repo = Repository::from_summary(summary, enrichment.readme, enrichment.details);

                tracing::info!("Fetched: {} ({} stars, {})", repo.name, repo.stars, repo.language);
                self.progress.set_message(repo.name.clone());
                self.progress.inc(1);

                sleep(self.config.item_delay).await;
                repo
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }
}

fn log_summary(repositories: &[Repository], pages_requested: u32) {
    let total_stars: u64 = repositories.iter().map(|r| u64::from(r.stars)).sum();
    let languages: BTreeSet<&str> = repositories
        .iter()
        .filter(|r| r.has_known_language())
        .map(|r| r.language.as_str())
        .collect();

    tracing::info!(
        "Fetched {} repositories over {} page request(s), {} total stars",
        repositories.len(),
        pages_requested,
        total_stars
    );
    if languages.is_empty() {
        tracing::info!("Languages: none detected");
    } else {
        tracing::info!(
            "Languages: {}",
            languages.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
}
