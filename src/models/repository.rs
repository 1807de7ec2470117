use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on stored readme text, in characters.
pub const README_MAX_CHARS: usize = 3_000;

pub const NO_DESCRIPTION: &str = "No description";
pub const UNKNOWN_LANGUAGE: &str = "Unknown";
pub const NO_README: &str = "No README available";

/// One entry of the `/users/{user}/repos` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    #[serde(default)]
    pub fork: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The subset of `/repos/{owner}/{repo}` used for enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoDetails {
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A fully enriched repository, built once per accepted listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub description: String,
    pub language: String,
    pub topics: Vec<String>,
    pub stars: u32,
    pub watchers: u32,
    pub open_issues: u32,
    pub created_at: String,
    pub updated_at: String,
    pub is_fork: bool,
    pub readme: String,
}

impl Repository {
    pub fn from_summary(summary: RepoSummary, readme: String, details: RepoDetails) -> Self {
        Self {
            name: summary.name,
            url: summary.html_url,
            description: summary
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            language: summary
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            topics: details.topics,
            stars: summary.stargazers_count,
            watchers: summary.watchers_count,
            open_issues: summary.open_issues_count,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            is_fork: summary.fork,
            readme: truncate_chars(&readme, README_MAX_CHARS),
        }
    }

    /// Last update as a UTC instant, or `None` if the API value is malformed.
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn has_known_language(&self) -> bool {
        self.language != UNKNOWN_LANGUAGE
    }
}

/// Keeps at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RepoSummary {
        RepoSummary {
            name: "widget".to_string(),
            html_url: "https://github.com/octo/widget".to_string(),
            description: None,
            language: None,
            stargazers_count: 4,
            watchers_count: 2,
            open_issues_count: 1,
            fork: false,
            created_at: "2023-01-02T03:04:05Z".to_string(),
            updated_at: "2024-05-06T07:08:09Z".to_string(),
        }
    }

    #[test]
    fn test_from_summary_applies_sentinels() {
        let repo = Repository::from_summary(summary(), NO_README.to_string(), RepoDetails::default());
        assert_eq!(repo.description, NO_DESCRIPTION);
        assert_eq!(repo.language, UNKNOWN_LANGUAGE);
        assert!(repo.topics.is_empty());
        assert!(!repo.has_known_language());
    }

    #[test]
    fn test_from_summary_bounds_readme() {
        let long = "é".repeat(README_MAX_CHARS + 50);
        let repo = Repository::from_summary(summary(), long, RepoDetails::default());
        assert_eq!(repo.readme.chars().count(), README_MAX_CHARS);
    }

    #[test]
    fn test_updated_at_parsing() {
        let mut repo = Repository::from_summary(summary(), String::new(), RepoDetails::default());
        assert!(repo.updated_at_utc().is_some());

        repo.updated_at = "last tuesday".to_string();
        assert!(repo.updated_at_utc().is_none());
    }

    #[test]
    fn test_truncate_chars_short_input_unchanged() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
