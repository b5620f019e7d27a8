//! The Loop Driver — owns the enrichment state fold.
//!
//! One driver instance serves one request at a time; the state, usage
//! ledger, and trace are all per-run values, so parallel requests are
//! just independent `run` calls on separate registries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use scopehound_config::EngineConfig;
use scopehound_core::{
    DomainEvent, EngineOutcome, EnrichmentPlan, EnrichmentState, EventBus, IterationRecord,
    Planner, PlanningContext, RunInput, StopReason, ToolRegistry, ValidationContext, Validator,
    ValidatorError, Verdict,
};
use scopehound_telemetry::{RequestMetrics, RequestTrace, Span, SpanKind};

use crate::executor::Executor;
use crate::handoff::{completed_outcome, escalation_outcome};
use crate::progress::no_progress;
use crate::router::{route, Route};

/// Maximum characters of static context rendered into prompts.
const STATIC_SUMMARY_LIMIT: usize = 1_500;

/// The terminal record plus the run's observability artifacts.
pub struct EngineOutput {
    pub outcome: EngineOutcome,
    pub metrics: RequestMetrics,
    pub trace: RequestTrace,
}

/// Orchestrates iterations, maintains history, enforces global budgets,
/// and computes progress.
pub struct LoopDriver {
    planner: Arc<dyn Planner>,
    validator: Arc<dyn Validator>,
    config: EngineConfig,
    event_bus: Arc<EventBus>,
}

impl LoopDriver {
    pub fn new(
        planner: Arc<dyn Planner>,
        validator: Arc<dyn Validator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            planner,
            validator,
            config,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Share an event bus with external observers.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    /// Drive one request to its terminal record.
    ///
    /// The registry is taken by value: its usage ledger is this request's
    /// budget state and must not leak into another run.
    pub async fn run(&self, input: &RunInput, registry: ToolRegistry) -> EngineOutput {
        let config = match &input.config {
            Some(overrides) => self.config.with_overrides(overrides),
            None => self.config.clone(),
        };

        let mut registry = registry
            .with_budgets(&config.tool_budgets)
            .with_timeout(Duration::from_secs(config.tool_timeout_secs));

        let mut state = EnrichmentState::new(config.token_budget, registry.usage().clone());
        let mut trace = RequestTrace::new(&input.request_id);
        let static_summary = input.static_summary(STATIC_SUMMARY_LIMIT);
        let website_url = input.effective_website_url();

        info!(
            request_id = %input.request_id,
            client_id = %input.client_id,
            max_iterations = config.max_iterations,
            token_budget = config.token_budget,
            "Enrichment run starting"
        );

        // ── Initial validation pass (iteration 0) ──
        let mut verdict = match self
            .validate_with_retry(input, &static_summary, &state, &mut trace)
            .await
        {
            Ok(verdict) => verdict,
            Err(_) => {
                state.stop(StopReason::ValidatorParseError);
                return self.finish(input, state, trace);
            }
        };
        apply_verdict(&mut state, &verdict);

        let mut made_no_progress = false;

        loop {
            match route(&state, &verdict, config.max_iterations, made_no_progress) {
                Route::Architect => {
                    state.stop(StopReason::Complete);
                    return self.finish(input, state, trace);
                }
                Route::Escalate(reason) => {
                    state.stop(reason);
                    return self.finish(input, state, trace);
                }
                Route::Enrich => {}
            }

            // ── One enrichment iteration ──
            state.iteration += 1;
            let mut iteration_span = Span::new(
                SpanKind::EnrichmentIteration,
                format!("iteration-{}", state.iteration),
            );
            let missing_before = state.last_missing.clone();

            // Plan
            let mut plan_span = Span::new(SpanKind::LlmCall, "planner");
            let plan = match self
                .planner
                .plan(PlanningContext {
                    raw_request: &input.raw_request,
                    static_summary: &static_summary,
                    website_url: website_url.as_deref(),
                    missing: &missing_before,
                    available_tools: &registry.available_tools(),
                    dynamic_context: &state.dynamic_context,
                    iteration: state.iteration,
                })
                .await
            {
                Ok(plan) => {
                    plan_span.end(true);
                    plan
                }
                Err(e) => {
                    // Iteration-local: an invalid plan is an empty plan,
                    // which surfaces as no-progress if it repeats.
                    warn!(iteration = state.iteration, error = %e, "Planning failed");
                    plan_span.end(false);
                    EnrichmentPlan::empty()
                }
            };
            trace.add_span(plan_span);

            // Execute
            let executor = Executor::new(self.event_bus.clone());
            let report = executor
                .execute(
                    &input.request_id,
                    state.iteration,
                    &plan,
                    &missing_before,
                    &mut registry,
                    state.remaining_tokens(),
                )
                .await;

            for outcome in &report.outcomes {
                let Some(tool) = outcome.tool else { continue };
                if outcome.params.is_none() {
                    continue; // dropped pre-dispatch, no invocation happened
                }
                let mut span = Span::new(SpanKind::ToolInvocation, tool.to_string());
                span.record_tokens(outcome.tokens);
                span.end(outcome.succeeded());
                trace.add_span(span.with_parent(&iteration_span.id));
            }

            let mut observations_added = Vec::new();
            for (key, observation) in report.observations {
                if state.dynamic_context.record(key.clone(), observation) {
                    observations_added.push(key);
                }
            }
            state.tokens_used += report.tokens_spent;
            state.tool_usage = registry.usage().clone();

            let confidence = IterationRecord::summary_confidence(
                report.questions_answered,
                report.questions_attempted,
                report.mean_answer_confidence,
            );

            // Validate against the enriched context
            verdict = match self
                .validate_with_retry(input, &static_summary, &state, &mut trace)
                .await
            {
                Ok(verdict) => verdict,
                Err(_) => {
                    // Keep the partial iteration on record before escalating
                    // so history length still matches the iteration count.
                    state.history.push(IterationRecord {
                        iteration: state.iteration,
                        plan,
                        actions: report.outcomes,
                        tokens_used: report.tokens_spent,
                        missing_before: missing_before.clone(),
                        missing_after: missing_before,
                        observations_added,
                        confidence,
                    });
                    state.stop(StopReason::ValidatorParseError);
                    iteration_span.end(false);
                    trace.add_span(iteration_span);
                    return self.finish(input, state, trace);
                }
            };
            apply_verdict(&mut state, &verdict);
            let missing_after = state.last_missing.clone();

            state.history.push(IterationRecord {
                iteration: state.iteration,
                plan,
                actions: report.outcomes,
                tokens_used: report.tokens_spent,
                missing_before: missing_before.clone(),
                missing_after: missing_after.clone(),
                observations_added,
                confidence,
            });

            made_no_progress = no_progress(&missing_before, &missing_after);

            self.event_bus.publish(DomainEvent::IterationCompleted {
                request_id: input.request_id.clone(),
                iteration: state.iteration,
                tokens_used: report.tokens_spent,
                questions_open: missing_after.len(),
                timestamp: Utc::now(),
            });

            iteration_span.end(true);
            trace.add_span(iteration_span);
        }
    }

    /// One retry with identical input; the Validator is the engine's only
    /// arbiter of completeness, so a second failure is terminal.
    async fn validate_with_retry(
        &self,
        input: &RunInput,
        static_summary: &str,
        state: &EnrichmentState,
        trace: &mut RequestTrace,
    ) -> Result<Verdict, ValidatorError> {
        let mut last_err = None;
        for attempt in 0..2 {
            let mut span = Span::new(
                SpanKind::ValidatorPass,
                format!("iteration-{}", state.iteration),
            );
            let result = self
                .validator
                .validate(ValidationContext {
                    raw_request: &input.raw_request,
                    static_summary,
                    website_content: input.website_content.as_deref(),
                    file_summaries: &input.file_summaries,
                    dynamic_context: &state.dynamic_context,
                    history: &state.history,
                    iteration: state.iteration,
                })
                .await;

            match result {
                Ok(verdict) => {
                    span.end(true);
                    trace.add_span(span);
                    self.event_bus.publish(DomainEvent::ValidatorPassed {
                        request_id: input.request_id.clone(),
                        iteration: state.iteration,
                        complete: verdict.complete,
                        confidence: verdict.confidence,
                        missing_count: verdict.missing.len(),
                        timestamp: Utc::now(),
                    });
                    return Ok(verdict);
                }
                Err(e) => {
                    span.end(false);
                    trace.add_span(span);
                    if attempt == 0 {
                        warn!(iteration = state.iteration, error = %e, "Validator failed, retrying once");
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ValidatorError::InvalidOutput("no attempts made".into())))
    }

    fn finish(
        &self,
        input: &RunInput,
        mut state: EnrichmentState,
        mut trace: RequestTrace,
    ) -> EngineOutput {
        let stop_reason = state.stop_reason.unwrap_or(StopReason::Deadline);
        if state.stop_reason.is_none() {
            state.stop_reason = Some(stop_reason);
        }

        let outcome = if stop_reason == StopReason::Complete {
            EngineOutcome::Completed(completed_outcome(&input.request_id, &state))
        } else {
            EngineOutcome::Escalated(escalation_outcome(&input.request_id, &state, stop_reason))
        };

        self.event_bus.publish(DomainEvent::RequestFinished {
            request_id: input.request_id.clone(),
            stop_reason,
            iterations: state.iteration,
            tokens_used: state.tokens_used,
            timestamp: Utc::now(),
        });

        trace.end();
        let metrics = RequestMetrics::from_state(&state);

        info!(
            request_id = %input.request_id,
            stop_reason = %stop_reason,
            iterations = state.iteration,
            tokens_used = state.tokens_used,
            "Enrichment run finished"
        );

        EngineOutput { outcome, metrics, trace }
    }
}

fn apply_verdict(state: &mut EnrichmentState, verdict: &Verdict) {
    state.last_missing = verdict.missing.clone();
    state.last_confidence = verdict.confidence;
    state.category = verdict.category;
    state.subcategories = verdict.subcategories.clone();
}
