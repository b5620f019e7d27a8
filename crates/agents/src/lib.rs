//! # Scopehound Agents
//!
//! LLM-driven implementations of the core [`Planner`] and [`Validator`]
//! traits. Both ask the model for strictly structured JSON and parse it
//! locally — the model never dispatches tools itself, which keeps budget
//! enforcement deterministic and testable.
//!
//! [`Planner`]: scopehound_core::Planner
//! [`Validator`]: scopehound_core::Validator

pub mod planner;
pub mod prompts;
pub mod validator;

pub use planner::LlmPlanner;
pub use validator::LlmValidator;

/// Pull the first JSON object out of a model response, tolerating code
/// fences and prose around it.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
