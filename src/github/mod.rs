pub mod client;
pub mod enrichment;
pub mod paginator;
pub mod rate_limiter;
pub mod source;

pub use client::GitHubClient;
pub use enrichment::{Enricher, Enrichment};
pub use paginator::{FetchConfig, FetchOutcome, FetchTermination, RepositoryFetcher};
pub use rate_limiter::{RateLimitGovernor, RateLimitSnapshot};
pub use source::{RepoPage, RepositorySource};
