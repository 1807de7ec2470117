pub mod pipeline;
pub mod selection;
pub mod strategy;

pub use pipeline::AnalysisPipeline;
pub use selection::select;
pub use strategy::{select_policy, FetchBudget, FetchPolicy, InclusionFilters};
