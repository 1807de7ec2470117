pub mod provider;
pub mod claude;
pub mod gemini;
pub mod prompts;

pub use provider::{LLMProvider, ProviderKind};
pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use prompts::AnalysisRequest;
