use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mode::{AnalysisDepth, FetchMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub username: String,
    pub analysis: String,
    pub total_repos_analyzed: usize,
    pub total_repos_fetched: usize,
    pub focus_area: FetchMode,
    pub analysis_depth: AnalysisDepth,
    pub analyzed_repositories: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub model_used: String,
}
