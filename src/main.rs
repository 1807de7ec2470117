use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use repo_invest::models::{AnalysisDepth, AnalysisReport, FetchMode};
use repo_invest::{
    AnalysisOptions, AnalysisPipeline, ClaudeProvider, Config, GeminiProvider, GitHubClient,
    LLMProvider, PipelineConfig, ProviderKind,
};

#[derive(Parser, Debug)]
#[command(name = "repo-invest")]
#[command(version = "0.1.0")]
#[command(about = "Score a GitHub user's repositories for investment potential")]
struct Args {
    /// GitHub username to analyze
    #[arg(short, long)]
    username: String,

    /// Which repositories to focus on
    #[arg(short, long, value_enum, default_value_t = FetchMode::Recent)]
    mode: FetchMode,

    /// Analysis depth
    #[arg(short, long, value_enum, default_value_t = AnalysisDepth::Comprehensive)]
    depth: AnalysisDepth,

    /// Skip repositories with fewer stars
    #[arg(long, default_value = "0")]
    min_stars: u32,

    /// Maximum repositories to fetch (all, popular and top20 modes)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_repos: Option<u32>,

    /// Include forked repositories
    #[arg(long)]
    include_forks: bool,

    /// LLM provider (defaults to LLM_PROVIDER or gemini)
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "text")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("repo_invest=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let options = AnalysisOptions {
        username: args.username.trim().to_string(),
        mode: args.mode,
        depth: args.depth,
        exclude_forks: !args.include_forks,
        min_stars: args.min_stars,
        max_repos: args.max_repos.map(|n| n as usize),
    };
    options.validate()?;

    // Initialize clients
    let github = GitHubClient::new(config.github_token.as_deref())?;
    let provider = args.provider.unwrap_or(config.llm_provider);
    let api_key = config.llm_api_key(provider)?.to_string();
    let llm: Arc<dyn LLMProvider> = match provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(api_key, args.model.clone())?),
        ProviderKind::Claude => Arc::new(ClaudeProvider::new(api_key, args.model.clone())?),
    };

    let pipeline_config = PipelineConfig {
        show_progress: true,
        ..PipelineConfig::from(&config)
    };
    let pipeline = AnalysisPipeline::from_parts(Arc::new(github), llm, pipeline_config);

    tracing::info!("Starting analysis for GitHub user: {}", options.username);
    let report = pipeline.analyze(&options).await?;

    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        "markdown" => format_markdown(&report),
        _ => format_text(&report),
    };
    println!("{}", output);

    Ok(())
}

fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n=== Investment Analysis: {} ===\n\n",
        report.username
    ));
    output.push_str(&format!(
        "Repositories analyzed: {} (from {} fetched)\n",
        report.total_repos_analyzed, report.total_repos_fetched
    ));
    output.push_str(&format!("Focus: {}\n", report.focus_area));
    output.push_str(&format!("Depth: {}\n", report.analysis_depth));
    output.push_str(&format!("Model: {}\n", report.model_used));
    output.push_str(&format!(
        "Repositories: {}\n\n",
        report.analyzed_repositories.join(", ")
    ));

    output.push_str(&report.analysis);
    output.push_str(&format!(
        "\n\nAnalyzed on: {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn format_markdown(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Investment Analysis: {}\n\n", report.username));
    output.push_str(&format!(
        "Generated: {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "Repositories Analyzed: {}",
        report.total_repos_analyzed
    ));
    if report.total_repos_fetched > 0 {
        output.push_str(&format!(" (from {} fetched)", report.total_repos_fetched));
    }
    output.push_str(&format!("\nFocus: {}\n", report.focus_area));
    output.push_str(&format!("Analysis Depth: {}\n\n", report.analysis_depth));

    output.push_str(&report.analysis);
    output.push('\n');

    output
}
