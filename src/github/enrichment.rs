//! Per-repository enrichment: readme text and topic tags.
//!
//! Every call here yields a value. Failures degrade to the documented
//! fallbacks (`NO_README`, empty topics) so one bad repository never aborts
//! the listing walk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::github::source::RepositorySource;
use crate::models::repository::{truncate_chars, NO_README, README_MAX_CHARS};
use crate::models::RepoDetails;

/// Supplementary data for one repository.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub readme: String,
    pub details: RepoDetails,
}

pub struct Enricher<'a> {
    source: &'a dyn RepositorySource,
}

impl<'a> Enricher<'a> {
    pub fn new(source: &'a dyn RepositorySource) -> Self {
        Self { source }
    }

    pub async fn enrich(&self, owner: &str, repo: &str) -> Enrichment {
        let readme = self.readme(owner, repo).await;
        let details = self.details(owner, repo).await;
        Enrichment { readme, details }
    }

    pub async fn readme(&self, owner: &str, repo: &str) -> String {
        match self.source.fetch_readme(owner, repo).await {
            Ok(Some(encoded)) => decode_readme(&encoded).unwrap_or_else(|| {
                tracing::debug!("Undecodable readme for {}/{}", owner, repo);
                NO_README.to_string()
            }),
            Ok(None) => NO_README.to_string(),
            Err(e) => {
                tracing::debug!("Readme fetch failed for {}/{}: {}", owner, repo, e);
                NO_README.to_string()
            }
        }
    }

    pub async fn details(&self, owner: &str, repo: &str) -> RepoDetails {
        self.source
            .fetch_details(owner, repo)
            .await
            .unwrap_or_else(|e| {
                tracing::debug!("Detail fetch failed for {}/{}: {}", owner, repo, e);
                RepoDetails::default()
            })
    }
}

/// Decodes the API's line-wrapped base64 payload into bounded UTF-8 text.
/// Returns `None` for empty, non-base64, or non-UTF-8 content.
pub fn decode_readme(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = STANDARD.decode(compact).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Some(truncate_chars(&text, README_MAX_CHARS))
}
