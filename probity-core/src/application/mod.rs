pub mod profiler;
pub mod scorecard;
pub mod validator;

// Re-exports
pub use profiler::{ProfileRecord, profile};
pub use scorecard::{Scorecard, summarize};
pub use validator::RuleValidator;
