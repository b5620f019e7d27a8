//! Terminal record construction: architect handoff and escalation.

use scopehound_core::{
    CompletedOutcome, EnrichedEntry, EnrichmentState, EscalationOutcome, StopReason,
};

/// Confidence below which an entry is flagged for the architect.
const UNCERTAIN_BELOW: f64 = 0.5;

/// Render the enriched context as labelled bullets for the architect
/// prompt. Sources are named so the architect can cite them; entries
/// under 0.5 confidence are flagged as uncertain.
pub fn render_enriched_context(entries: &[EnrichedEntry]) -> String {
    if entries.is_empty() {
        return "No enriched context was gathered.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let flag = if entry.confidence < UNCERTAIN_BELOW { " (uncertain)" } else { "" };
            format!(
                "- {}: {} (source: {}, confidence {:.2}{flag})",
                entry.key, entry.value, entry.source_tool, entry.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the architect-bound terminal record from a completed run.
pub fn completed_outcome(request_id: &str, state: &EnrichmentState) -> CompletedOutcome {
    CompletedOutcome {
        request_id: request_id.to_string(),
        category: state.category,
        subcategories: state.subcategories.clone(),
        enriched_context: EnrichedEntry::from_context(&state.dynamic_context),
        history: state.history.clone(),
        tokens_used: state.tokens_used,
        iterations: state.iteration,
    }
}

/// Build the human-review record from a failed run. Everything already
/// discovered rides along so the reviewer does not re-discover it.
pub fn escalation_outcome(
    request_id: &str,
    state: &EnrichmentState,
    stop_reason: StopReason,
) -> EscalationOutcome {
    EscalationOutcome {
        request_id: request_id.to_string(),
        category: state.category,
        subcategories: state.subcategories.clone(),
        stop_reason,
        missing_questions: state.last_missing.clone(),
        enriched_context: EnrichedEntry::from_context(&state.dynamic_context),
        history: state.history.clone(),
        tokens_used: state.tokens_used,
        iterations: state.iteration,
    }
}
