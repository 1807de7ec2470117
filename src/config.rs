use std::env;
use std::time::Duration;

use crate::analysis::strategy::InclusionFilters;
use crate::error::{Error, Result};
use crate::github::FetchConfig;
use crate::llm::ProviderKind;
use crate::models::{AnalysisDepth, FetchMode};

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub llm_provider: ProviderKind,
    pub concurrency_limit: usize,
    pub request_delay_ms: u64,
    pub page_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_provider = match non_empty("LLM_PROVIDER") {
            Some(v) => v.parse().map_err(Error::Config)?,
            None => ProviderKind::Gemini,
        };

        let concurrency_limit = non_empty("CONCURRENCY_LIMIT")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(1);

        let request_delay_ms = non_empty("REQUEST_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        let page_delay_ms = non_empty("PAGE_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_000);

        Ok(Self {
            github_token: non_empty("GITHUB_TOKEN"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            llm_provider,
            concurrency_limit,
            request_delay_ms,
            page_delay_ms,
        })
    }

    /// The API key for `provider`, which must be set.
    pub fn llm_api_key(&self, provider: ProviderKind) -> Result<&str> {
        let (key, var) = match provider {
            ProviderKind::Gemini => (&self.gemini_api_key, "GEMINI_API_KEY"),
            ProviderKind::Claude => (&self.anthropic_api_key, "ANTHROPIC_API_KEY"),
        };
        key.as_deref()
            .ok_or_else(|| Error::Config(format!("{} environment variable not set", var)))
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub show_progress: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            fetch: FetchConfig {
                item_delay: Duration::from_millis(config.request_delay_ms),
                page_delay: Duration::from_millis(config.page_delay_ms),
                concurrency: config.concurrency_limit,
                ..FetchConfig::default()
            },
            show_progress: false,
        }
    }
}

/// What the caller asked to analyze.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub username: String,
    pub mode: FetchMode,
    pub depth: AnalysisDepth,
    pub exclude_forks: bool,
    pub min_stars: u32,
    pub max_repos: Option<usize>,
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Config("username must not be empty".to_string()));
        }
        if self.max_repos == Some(0) {
            return Err(Error::Config("max repositories must be at least 1".to_string()));
        }
        if self.max_repos.is_some() && !self.mode.honors_max_repos() {
            tracing::info!(
                "Ignoring max repositories in {} mode, which uses its own fetch cap",
                self.mode
            );
        }
        Ok(())
    }

    pub fn filters(&self) -> InclusionFilters {
        InclusionFilters {
            exclude_forks: self.exclude_forks,
            min_stars: self.min_stars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn options(username: &str, mode: FetchMode, max_repos: Option<usize>) -> AnalysisOptions {
        AnalysisOptions {
            username: username.to_string(),
            mode,
            depth: AnalysisDepth::Quick,
            exclude_forks: true,
            min_stars: 0,
            max_repos,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.github_token.is_none());
        assert_eq!(config.llm_provider, ProviderKind::Gemini);
        assert_eq!(config.concurrency_limit, 1);
        assert_eq!(config.request_delay_ms, 500);
        assert_eq!(config.page_delay_ms, 1_000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("LLM_PROVIDER", "Claude"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("CONCURRENCY_LIMIT", "4"),
            ("REQUEST_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.llm_provider, ProviderKind::Claude);
        assert_eq!(config.llm_api_key(ProviderKind::Claude).unwrap(), "sk-ant");
        assert_eq!(config.concurrency_limit, 4);

        let pipeline = PipelineConfig::from(&config);
        assert_eq!(pipeline.fetch.item_delay, Duration::ZERO);
        assert_eq!(pipeline.fetch.concurrency, 4);
    }

    #[test]
    fn test_missing_provider_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        let err = config.llm_api_key(ProviderKind::Gemini).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Config::from_lookup(lookup(&[("LLM_PROVIDER", "palm")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_options_validation() {
        assert!(options("octo", FetchMode::All, Some(50)).validate().is_ok());
        assert!(options("octo", FetchMode::Recent, Some(50)).validate().is_ok());
        assert!(options("  ", FetchMode::All, None).validate().is_err());
        assert!(options("octo", FetchMode::Top20, Some(0)).validate().is_err());
    }
}
