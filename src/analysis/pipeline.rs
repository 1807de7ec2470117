use std::sync::Arc;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Duration;

use crate::analysis::selection::select;
use crate::analysis::strategy::select_policy;
use crate::config::{AnalysisOptions, PipelineConfig};
use crate::error::{Error, Result};
use crate::github::{FetchTermination, RepositoryFetcher, RepositorySource};
use crate::llm::{AnalysisRequest, LLMProvider};
use crate::models::{AnalysisReport, FetchMode};

/// Above this many repositories in `all` mode a cheaper mode is suggested.
const LARGE_ALL_SELECTION: usize = 30;

pub struct AnalysisPipeline {
    source: Arc<dyn RepositorySource>,
    llm: Arc<dyn LLMProvider>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        source: impl RepositorySource + 'static,
        llm: impl LLMProvider + 'static,
        config: PipelineConfig,
    ) -> Self {
        Self::from_parts(Arc::new(source), Arc::new(llm), config)
    }

    pub fn from_parts(
        source: Arc<dyn RepositorySource>,
        llm: Arc<dyn LLMProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            llm,
            config,
        }
    }

    pub async fn analyze(&self, options: &AnalysisOptions) -> Result<AnalysisReport> {
        options.validate()?;

        // Step 1: Decide how much of the listing is needed
        let policy = select_policy(options.mode, options.max_repos, options.filters());
        tracing::info!("Focus: {}, fetch budget: {:?}", options.mode, policy.budget);

        // Step 2: Walk the listing
        let fetcher = RepositoryFetcher::new(self.source.clone(), self.config.fetch.clone())
            .with_progress(self.progress_bar());
        let outcome = fetcher.fetch(&options.username, &policy).await;

        match &outcome.termination {
            FetchTermination::UserNotFound if outcome.repositories.is_empty() => {
                return Err(Error::UserNotFound(options.username.clone()));
            }
            FetchTermination::UserNotFound | FetchTermination::RequestFailed(_) => {
                tracing::warn!(
                    "Listing ended early, continuing with {} repositories",
                    outcome.repositories.len()
                );
            }
            FetchTermination::EndOfListing | FetchTermination::CapReached => {}
        }

        // Step 3: Narrow down to the analysis set
        let total_fetched = outcome.repositories.len();
        let selected = select(options.mode, outcome.repositories, Utc::now());
        if selected.is_empty() {
            return Err(Error::NoRepositories {
                mode: options.mode,
                fetched: total_fetched,
            });
        }

        tracing::info!(
            "Selected {} of {} fetched repositories for analysis",
            selected.len(),
            total_fetched
        );
        if options.mode == FetchMode::All && selected.len() > LARGE_ALL_SELECTION {
            tracing::info!(
                "Analyzing all {} repositories; 'popular', 'recent' or 'active' are faster",
                selected.len()
            );
        }

        // Step 4: Build the prompt and ask the model
        let analyzed_repositories = selected.iter().map(|r| r.name.clone()).collect();
        let request = AnalysisRequest::new(selected, options.depth, total_fetched);
        let prompt = request.to_prompt();

        tracing::info!(
            "Analyzing with {} ({}), depth: {}",
            self.llm.name(),
            self.llm.model(),
            options.depth
        );
        let analysis = self.llm.generate(&prompt).await?;

        Ok(AnalysisReport {
            username: options.username.clone(),
            analysis,
            total_repos_analyzed: request.repositories.len(),
            total_repos_fetched: total_fetched,
            focus_area: options.mode,
            analysis_depth: options.depth,
            analyzed_repositories,
            timestamp: Utc::now(),
            model_used: self.llm.model().to_string(),
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} repos fetched {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}
