use crate::models::repository::truncate_chars;
use crate::models::{AnalysisDepth, Repository};

/// Readme characters included per repository in a prompt.
pub const README_PREVIEW_CHARS: usize = 1_500;

pub const SYSTEM_PROMPT: &str = "You are a venture capital analyst who evaluates open source \
GitHub repositories for commercial and investment potential. Be specific, realistic, and \
focus on commercial viability over technical impressiveness.";

const QUICK_TEMPLATE: &str = r#"Quickly scan these {count} repositories and report:

## TOP 3 INVESTMENT OPPORTUNITIES
For each: project name with a one-line pitch, why it is fundable (two sentences at most),
market size potential, and an investment score (X/10).

## DEVELOPER PROFILE
Key strengths as bullet points, and the single best project to focus on for funding.

## QUICK VERDICT
Portfolio grade (A-F), funding readiness (Yes / No / 6 months), and the recommended next step.

REPOSITORIES:
{repositories}
Keep it concise and actionable. Only cover the most promising opportunities."#;

const COMPREHENSIVE_TEMPLATE: &str = r#"{context}

Evaluate each repository on:
1. Problem-solution fit
2. Market size (TAM/SAM/SOM)
3. Technical innovation
4. Competitive advantage and defensibility
5. Team capability (code quality, documentation, velocity)
6. Traction (stars, community engagement, adoption)
7. Monetization potential
8. Scalability

REPOSITORIES TO ANALYZE:
{repositories}
DELIVERABLES:

## TOP INVESTMENT OPPORTUNITIES (max 5)
For each: one-line pitch, investment thesis, market opportunity, unique value proposition,
revenue model, top risks, next steps to become investment-ready, investment score (X/10),
and funding stage readiness (pre-seed / seed / series A).

## PROJECTS TO WATCH (max 3)
Projects with potential that need more development.

## DEVELOPER PROFILE
Technical strengths, domain expertise, entrepreneurial indicators, and red flags.

## STRATEGIC RECOMMENDATIONS
Priority project for fundraising, top three improvements before approaching investors,
missing elements investors expect, and a positioning strategy.

## INVESTMENT VERDICT
Portfolio grade (A-F) with explanation, funding readiness (not ready / 3-6 months / ready now),
potential check size and valuation, and the best investor type."#;

/// The prompt payload for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub repositories: Vec<Repository>,
    pub depth: AnalysisDepth,
    pub total_fetched: usize,
}

impl AnalysisRequest {
    pub fn new(repositories: Vec<Repository>, depth: AnalysisDepth, total_fetched: usize) -> Self {
        Self {
            repositories,
            depth,
            total_fetched,
        }
    }

    pub fn to_prompt(&self) -> String {
        let summaries: String = self.repositories.iter().map(repository_summary).collect();
        let count = self.repositories.len();

        match self.depth {
            AnalysisDepth::Quick => QUICK_TEMPLATE
                .replace("{count}", &count.to_string())
                .replace("{repositories}", &summaries),
            AnalysisDepth::Comprehensive => {
                let mut context = format!("Analyzing {} repositories", count);
                if count < self.total_fetched {
                    context.push_str(&format!(
                        " (selected from {} total repositories)",
                        self.total_fetched
                    ));
                }
                COMPREHENSIVE_TEMPLATE
                    .replace("{context}", &context)
                    .replace("{repositories}", &summaries)
            }
        }
    }
}

fn repository_summary(repo: &Repository) -> String {
    let topics = if repo.topics.is_empty() {
        "None".to_string()
    } else {
        repo.topics.join(", ")
    };

    format!(
        "\nRepository: {}\nURL: {}\nDescription: {}\nStars: {} | Watchers: {} | Open Issues: {}\n\
         Language: {}\nTopics: {}\nCreated: {}\nLast Updated: {}\n\nREADME Preview:\n{}\n---\n",
        repo.name,
        repo.url,
        repo.description,
        repo.stars,
        repo.watchers,
        repo.open_issues,
        repo.language,
        topics,
        repo.created_at,
        repo.updated_at,
        truncate_chars(&repo.readme, README_PREVIEW_CHARS),
    )
}
