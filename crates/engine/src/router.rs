//! The routing decision after each Validator pass.
//!
//! A pure function: no clocks, no I/O, no state mutation. The evaluation
//! order is part of the contract — when a run both exhausts its
//! iterations and stalls, `max_iterations` wins because it is checked
//! first.

use scopehound_core::{EnrichmentState, RequestCategory, StopReason, Verdict};

/// Where the request goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Enough context: hand off to the architect.
    Architect,
    /// Terminal failure: escalate to human review.
    Escalate(StopReason),
    /// Run another enrichment iteration.
    Enrich,
}

/// Choose the next edge from the state after a Validator pass.
///
/// `made_no_progress` is computed by the Loop Driver for the
/// just-completed iteration; it is always `false` after the initial
/// (iteration-0) pass.
pub fn route(
    state: &EnrichmentState,
    verdict: &Verdict,
    max_iterations: u32,
    made_no_progress: bool,
) -> Route {
    if verdict.complete {
        return Route::Architect;
    }
    if state.iteration == 0 && verdict.category == RequestCategory::Unclear {
        // No tool answers a request the classifier cannot place.
        return Route::Escalate(StopReason::Unclear);
    }
    if state.iteration >= max_iterations {
        return Route::Escalate(StopReason::MaxIterations);
    }
    if state.tokens_used >= state.token_budget {
        return Route::Escalate(StopReason::TokenLimit);
    }
    if made_no_progress {
        return Route::Escalate(StopReason::NoProgress);
    }
    Route::Enrich
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopehound_core::ToolUsage;

    fn state(iteration: u32, tokens_used: u64, token_budget: u64) -> EnrichmentState {
        let mut state = EnrichmentState::new(token_budget, ToolUsage::with_defaults());
        state.iteration = iteration;
        state.tokens_used = tokens_used;
        state
    }

    fn verdict(complete: bool, category: RequestCategory) -> Verdict {
        Verdict {
            complete,
            missing: if complete { vec![] } else { vec!["q".into()] },
            confidence: 0.5,
            category,
            subcategories: vec![],
            reasoning: String::new(),
        }
    }

    #[test]
    fn complete_routes_to_architect() {
        let r = route(
            &state(2, 499_999, 500_000),
            &verdict(true, RequestCategory::FormChanges),
            3,
            true,
        );
        assert_eq!(r, Route::Architect);
    }

    #[test]
    fn unclear_at_iteration_zero_fast_paths_to_escalation() {
        let r = route(
            &state(0, 0, 500_000),
            &verdict(false, RequestCategory::Unclear),
            3,
            false,
        );
        assert_eq!(r, Route::Escalate(StopReason::Unclear));
    }

    #[test]
    fn unclear_after_enrichment_is_not_a_fast_path() {
        let r = route(
            &state(1, 0, 500_000),
            &verdict(false, RequestCategory::Unclear),
            3,
            false,
        );
        assert_eq!(r, Route::Enrich);
    }

    #[test]
    fn max_iterations_escalates() {
        let r = route(
            &state(3, 0, 500_000),
            &verdict(false, RequestCategory::SeoOptimization),
            3,
            false,
        );
        assert_eq!(r, Route::Escalate(StopReason::MaxIterations));
    }

    #[test]
    fn zero_max_iterations_escalates_after_initial_pass() {
        let r = route(
            &state(0, 0, 500_000),
            &verdict(false, RequestCategory::ContentUpdate),
            0,
            false,
        );
        assert_eq!(r, Route::Escalate(StopReason::MaxIterations));
    }

    #[test]
    fn token_limit_escalates() {
        let r = route(
            &state(1, 12_000, 10_000),
            &verdict(false, RequestCategory::SeoOptimization),
            3,
            false,
        );
        assert_eq!(r, Route::Escalate(StopReason::TokenLimit));
    }

    #[test]
    fn zero_token_budget_escalates_before_any_planning() {
        let r = route(
            &state(0, 0, 0),
            &verdict(false, RequestCategory::ContentUpdate),
            3,
            false,
        );
        assert_eq!(r, Route::Escalate(StopReason::TokenLimit));
    }

    #[test]
    fn no_progress_escalates() {
        let r = route(
            &state(2, 5_000, 500_000),
            &verdict(false, RequestCategory::SeoOptimization),
            3,
            true,
        );
        assert_eq!(r, Route::Escalate(StopReason::NoProgress));
    }

    #[test]
    fn max_iterations_wins_over_no_progress() {
        // A run that plateaus exactly on its last allowed iteration.
        let r = route(
            &state(3, 5_000, 500_000),
            &verdict(false, RequestCategory::DesignChanges),
            3,
            true,
        );
        assert_eq!(r, Route::Escalate(StopReason::MaxIterations));
    }

    #[test]
    fn otherwise_enrich() {
        let r = route(
            &state(1, 5_000, 500_000),
            &verdict(false, RequestCategory::DesignChanges),
            3,
            false,
        );
        assert_eq!(r, Route::Enrich);
    }
}
