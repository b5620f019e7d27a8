//! Enrichment plan — the structured output of a Planner pass.
//!
//! The Planner never executes anything. It emits an ordered action list
//! which the Executor validates and dispatches; that split keeps budget
//! enforcement out of the LLM's hands.

use serde::{Deserialize, Serialize};

/// A single proposed tool call.
///
/// `tool` is a raw string: the Planner is advisory, not trusted, and may
/// name a tool that does not exist or has no budget left. The Executor
/// resolves and filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    /// Tool name as the Planner wrote it.
    pub tool: String,

    /// The missing question this action aims to answer.
    pub question: String,

    /// Loose parameter object, validated into typed params at dispatch.
    #[serde(default)]
    pub params: serde_json::Value,

    /// Why this tool was chosen for this question.
    #[serde(default)]
    pub rationale: String,
}

/// An ordered list of actions plus the Planner's own token estimate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentPlan {
    pub actions: Vec<PlannedAction>,

    #[serde(default)]
    pub estimated_tokens: u64,

    /// Overall strategy for this enrichment attempt.
    #[serde(default)]
    pub strategy: String,
}

impl EnrichmentPlan {
    /// The plan used when planning fails or yields nothing: zero actions.
    /// The iteration still counts; the Loop Driver will see no progress.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_deserializes_from_planner_json() {
        let raw = json!({
            "actions": [
                {
                    "tool": "pdf_extract",
                    "question": "What are the brand colours?",
                    "params": {"path": "brand-kit.pdf"},
                    "rationale": "The attachment is a brand PDF"
                }
            ],
            "estimated_tokens": 3000,
            "strategy": "Pull brand details from the attached PDF"
        });
        let plan: EnrichmentPlan = serde_json::from_value(raw).unwrap();
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].tool, "pdf_extract");
        assert_eq!(plan.estimated_tokens, 3000);
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw = json!({"actions": [{"tool": "web_search", "question": "q"}]});
        let plan: EnrichmentPlan = serde_json::from_value(raw).unwrap();
        assert_eq!(plan.estimated_tokens, 0);
        assert!(plan.actions[0].rationale.is_empty());
        assert!(plan.actions[0].params.is_null());
    }

    #[test]
    fn empty_plan_is_empty() {
        assert!(EnrichmentPlan::empty().is_empty());
    }
}
