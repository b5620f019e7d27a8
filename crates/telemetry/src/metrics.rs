//! The fixed per-request metric set.
//!
//! Metric names are part of the external observability contract and must
//! not drift: dashboards and alerts key on them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use scopehound_core::{EnrichmentState, StopReason, ToolName};

/// Per-request metrics, computed once on the terminal transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub enrichment_iterations: u32,
    pub enrichment_success: bool,
    pub enrichment_stop_reason: StopReason,
    pub enrichment_total_tokens: u64,
    /// Fraction of initially-missing questions resolved by enrichment.
    pub enrichment_answer_rate: f64,
    /// Calls made per tool, keyed `tool_<name>_calls`.
    pub tool_calls: Vec<(ToolName, u32)>,
    /// Mean confidence across all dynamic-context observations.
    pub final_enrichment_confidence: f64,
}

impl RequestMetrics {
    /// Derive the metric set from a terminal state.
    pub fn from_state(state: &EnrichmentState) -> Self {
        let stop_reason = state.stop_reason.unwrap_or(StopReason::Deadline);
        Self {
            enrichment_iterations: state.iteration,
            enrichment_success: stop_reason == StopReason::Complete,
            enrichment_stop_reason: stop_reason,
            enrichment_total_tokens: state.tokens_used,
            enrichment_answer_rate: state.answer_rate(),
            tool_calls: ToolName::ALL
                .into_iter()
                .map(|t| (t, state.tool_usage.calls_made(t)))
                .collect(),
            final_enrichment_confidence: state.dynamic_context.mean_confidence(),
        }
    }

    /// Flatten to the wire form: one entry per metric name.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("enrichment_iterations".into(), json!(self.enrichment_iterations));
        map.insert("enrichment_success".into(), json!(self.enrichment_success));
        map.insert(
            "enrichment_stop_reason".into(),
            json!(self.enrichment_stop_reason.as_str()),
        );
        map.insert("enrichment_total_tokens".into(), json!(self.enrichment_total_tokens));
        map.insert("enrichment_answer_rate".into(), json!(self.enrichment_answer_rate));
        for (tool, calls) in &self.tool_calls {
            map.insert(format!("tool_{tool}_calls"), json!(calls));
        }
        map.insert(
            "final_enrichment_confidence".into(),
            json!(self.final_enrichment_confidence),
        );
        map
    }
}
