//! Terminal records — exactly one per run.

use serde::{Deserialize, Serialize};

use crate::category::RequestCategory;
use crate::context::DynamicContext;
use crate::state::{IterationRecord, StopReason};
use crate::tool::ToolName;

/// One dynamic-context entry flattened for handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub source_tool: ToolName,
    pub confidence: f64,
}

impl EnrichedEntry {
    /// Flatten a dynamic context into handoff entries, in key order.
    pub fn from_context(ctx: &DynamicContext) -> Vec<Self> {
        ctx.iter()
            .map(|(key, obs)| Self {
                key: key.clone(),
                value: obs.value.clone(),
                source_tool: obs.source_tool,
                confidence: obs.confidence,
            })
            .collect()
    }
}

/// The request carried enough information; hand off to the architect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedOutcome {
    pub request_id: String,
    pub category: RequestCategory,
    pub subcategories: Vec<String>,
    pub enriched_context: Vec<EnrichedEntry>,
    pub history: Vec<IterationRecord>,
    pub tokens_used: u64,
    pub iterations: u32,
}

/// The loop could not reach "complete"; escalate to human review with the
/// full evidence trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationOutcome {
    pub request_id: String,
    pub category: RequestCategory,
    pub subcategories: Vec<String>,
    pub stop_reason: StopReason,
    pub missing_questions: Vec<String>,
    pub enriched_context: Vec<EnrichedEntry>,
    pub history: Vec<IterationRecord>,
    pub tokens_used: u64,
    pub iterations: u32,
}

/// Exactly one of the two terminal records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EngineOutcome {
    Completed(CompletedOutcome),
    Escalated(EscalationOutcome),
}

impl EngineOutcome {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Completed(o) => &o.request_id,
            Self::Escalated(o) => &o.request_id,
        }
    }

    pub fn stop_reason(&self) -> StopReason {
        match self {
            Self::Completed(_) => StopReason::Complete,
            Self::Escalated(o) => o.stop_reason,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            Self::Completed(o) => o.iterations,
            Self::Escalated(o) => o.iterations,
        }
    }

    pub fn tokens_used(&self) -> u64 {
        match self {
            Self::Completed(o) => o.tokens_used,
            Self::Escalated(o) => o.tokens_used,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Observation;
    use serde_json::json;

    #[test]
    fn entries_flatten_in_key_order() {
        let mut ctx = DynamicContext::new();
        ctx.record(
            "fonts",
            Observation {
                value: json!(["Montserrat"]),
                source_tool: ToolName::PdfExtract,
                confidence: 0.8,
                iteration: 1,
            },
        );
        ctx.record(
            "brand_primary",
            Observation {
                value: json!("#FF6B6B"),
                source_tool: ToolName::PdfExtract,
                confidence: 0.95,
                iteration: 1,
            },
        );

        let entries = EnrichedEntry::from_context(&ctx);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "brand_primary");
        assert_eq!(entries[1].key, "fonts");
    }

    #[test]
    fn outcome_accessors() {
        let outcome = EngineOutcome::Escalated(EscalationOutcome {
            request_id: "req-9".into(),
            category: RequestCategory::SeoOptimization,
            subcategories: vec![],
            stop_reason: StopReason::NoProgress,
            missing_questions: vec!["Which pages?".into()],
            enriched_context: vec![],
            history: vec![],
            tokens_used: 4000,
            iterations: 2,
        });
        assert!(!outcome.is_complete());
        assert_eq!(outcome.stop_reason(), StopReason::NoProgress);
        assert_eq!(outcome.iterations(), 2);
        assert_eq!(outcome.request_id(), "req-9");
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = EngineOutcome::Completed(CompletedOutcome {
            request_id: "req-1".into(),
            category: RequestCategory::FormChanges,
            subcategories: vec![],
            enriched_context: vec![],
            history: vec![],
            tokens_used: 100,
            iterations: 1,
        });
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"completed\""));
    }
}
