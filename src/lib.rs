pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod analysis;

pub use config::{AnalysisOptions, Config, PipelineConfig};
pub use error::{Error, Result};
pub use github::{GitHubClient, RepositoryFetcher};
pub use llm::{ClaudeProvider, GeminiProvider, LLMProvider, ProviderKind};
pub use analysis::AnalysisPipeline;
