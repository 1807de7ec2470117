use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which slice of a user's repositories an analysis focuses on.
///
/// The mode drives both how much of the listing is fetched and how the
/// fetched set is narrowed down afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Every repository, optionally bounded by `--max-repos`.
    All,
    /// Ten most starred repositories.
    Popular,
    /// Ten most recently updated repositories.
    Recent,
    /// Twenty most starred repositories.
    Top20,
    /// Up to fifteen repositories updated within the last six months.
    Active,
}

impl FetchMode {
    /// Whether the caller-supplied maximum applies to this mode.
    pub fn honors_max_repos(&self) -> bool {
        matches!(self, FetchMode::All | FetchMode::Popular | FetchMode::Top20)
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::All => write!(f, "all"),
            FetchMode::Popular => write!(f, "popular"),
            FetchMode::Recent => write!(f, "recent"),
            FetchMode::Top20 => write!(f, "top20"),
            FetchMode::Active => write!(f, "active"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Short scan, key opportunities only.
    Quick,
    /// Full investment write-up.
    Comprehensive,
}

impl std::fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisDepth::Quick => write!(f, "quick"),
            AnalysisDepth::Comprehensive => write!(f, "comprehensive"),
        }
    }
}
