//! Deterministic plan execution.
//!
//! The Executor is the trust boundary between the advisory Planner and
//! the side-effectful tool fleet: it re-validates every action, enforces
//! the token ceiling, and isolates tool failures to their own action.
//! Actions run sequentially in planner order, so replays with the same
//! tool outputs yield the same dynamic context.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use scopehound_core::context::Observation;
use scopehound_core::state::{normalize_question, normalized_set};
use scopehound_core::{
    ActionOutcome, ActionStatus, DomainEvent, EnrichmentPlan, EventBus, ToolName, ToolParams,
    ToolRegistry,
};

/// Everything one Executor pass produced, for the Loop Driver to fold
/// into the request state.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Per-action outcomes, in planner order.
    pub outcomes: Vec<ActionOutcome>,
    /// Tokens attributed to this pass (sum of tool estimates).
    pub tokens_spent: u64,
    /// Observations to merge, in planner-assigned order.
    pub observations: Vec<(String, Observation)>,
    /// Distinct questions with at least one successful observation.
    pub questions_answered: usize,
    /// Distinct questions the plan targeted.
    pub questions_attempted: usize,
    /// Mean confidence across successful actions' observations.
    pub mean_answer_confidence: f64,
}

/// Dispatches a filtered plan through the Tool Registry.
pub struct Executor {
    event_bus: Arc<EventBus>,
}

impl Executor {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self { event_bus }
    }

    /// Run every action the plan proposes, in order.
    ///
    /// `missing` is the outstanding question list entering this iteration:
    /// the Planner must not invent gaps of its own, so an action whose
    /// question is not in that list is dropped unanswered. Dropped actions
    /// (invented question, unknown tool, exhausted budget, crossed token
    /// ceiling) still produce outcomes so the iteration record shows what
    /// the Planner asked for. A tool failure never aborts the remaining
    /// actions; only the token ceiling does.
    pub async fn execute(
        &self,
        request_id: &str,
        iteration: u32,
        plan: &EnrichmentPlan,
        missing: &[String],
        registry: &mut ToolRegistry,
        remaining_tokens: u64,
    ) -> ExecutionReport {
        let mut report = ExecutionReport {
            questions_attempted: distinct_questions(plan),
            ..Default::default()
        };
        let allowed_questions = normalized_set(missing);
        let mut answered: std::collections::BTreeSet<String> = Default::default();
        let mut confidence_sum = 0.0;
        let mut confidence_count = 0usize;

        for action in &plan.actions {
            if report.tokens_spent >= remaining_tokens {
                report.outcomes.push(ActionOutcome {
                    tool: ToolName::parse(&action.tool),
                    question: action.question.clone(),
                    params: None,
                    status: ActionStatus::SkippedTokenBudget,
                    tokens: 0,
                });
                continue;
            }

            if !allowed_questions.contains(&normalize_question(&action.question)) {
                warn!(
                    question = %action.question,
                    "Planner targeted a question outside the missing list; dropping action"
                );
                report.outcomes.push(ActionOutcome {
                    tool: ToolName::parse(&action.tool),
                    question: action.question.clone(),
                    params: None,
                    status: ActionStatus::SkippedUnknownQuestion,
                    tokens: 0,
                });
                continue;
            }

            let Some(tool) = ToolName::parse(&action.tool) else {
                warn!(tool = %action.tool, "Planner named an unknown tool; dropping action");
                report.outcomes.push(ActionOutcome {
                    tool: None,
                    question: action.question.clone(),
                    params: None,
                    status: ActionStatus::SkippedUnknownTool { name: action.tool.clone() },
                    tokens: 0,
                });
                continue;
            };

            if !registry.usage().has_budget(tool) {
                debug!(tool = %tool, "Tool budget exhausted; dropping action");
                report.outcomes.push(ActionOutcome {
                    tool: Some(tool),
                    question: action.question.clone(),
                    params: None,
                    status: ActionStatus::SkippedBudget,
                    tokens: 0,
                });
                continue;
            }

            let params = match ToolParams::from_parts(tool, &action.params) {
                Ok(params) => params,
                Err(err) => {
                    report.outcomes.push(ActionOutcome {
                        tool: Some(tool),
                        question: action.question.clone(),
                        params: None,
                        status: ActionStatus::Failed {
                            kind: err.kind().into(),
                            message: err.to_string(),
                        },
                        tokens: 0,
                    });
                    continue;
                }
            };

            let start = Instant::now();
            let result = registry.invoke(&params).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    let mut keys = Vec::with_capacity(output.observations.len());
                    for (key, value) in &output.observations {
                        let confidence = output.confidence_for(key);
                        report.observations.push((
                            key.clone(),
                            Observation {
                                value: value.clone(),
                                source_tool: tool,
                                confidence,
                                iteration,
                            },
                        ));
                        confidence_sum += confidence;
                        confidence_count += 1;
                        keys.push(key.clone());
                    }

                    if !keys.is_empty() {
                        answered.insert(action.question.clone());
                    }

                    report.tokens_spent += output.est_tokens;
                    report.outcomes.push(ActionOutcome {
                        tool: Some(tool),
                        question: action.question.clone(),
                        params: Some(params),
                        status: ActionStatus::Completed { keys },
                        tokens: output.est_tokens,
                    });

                    self.event_bus.publish(DomainEvent::ToolInvoked {
                        request_id: request_id.to_string(),
                        tool,
                        success: true,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                }
                Err(err) => {
                    warn!(tool = %tool, error = %err, "Tool invocation failed");
                    report.outcomes.push(ActionOutcome {
                        tool: Some(tool),
                        question: action.question.clone(),
                        params: Some(params),
                        status: ActionStatus::Failed {
                            kind: err.kind().into(),
                            message: err.to_string(),
                        },
                        tokens: 0,
                    });

                    self.event_bus.publish(DomainEvent::ToolInvoked {
                        request_id: request_id.to_string(),
                        tool,
                        success: false,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        report.questions_answered = answered.len();
        report.mean_answer_confidence = if confidence_count == 0 {
            0.0
        } else {
            confidence_sum / confidence_count as f64
        };
        report
    }
}

fn distinct_questions(plan: &EnrichmentPlan) -> usize {
    plan.actions
        .iter()
        .map(|a| a.question.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopehound_core::PlannedAction;
    use scopehound_tools::default_registry;
    use serde_json::json;
    use std::time::Duration;

    fn plan(actions: Vec<PlannedAction>) -> EnrichmentPlan {
        EnrichmentPlan { actions, estimated_tokens: 0, strategy: String::new() }
    }

    fn action(tool: &str, question: &str, params: serde_json::Value) -> PlannedAction {
        PlannedAction {
            tool: tool.into(),
            question: question.into(),
            params,
            rationale: String::new(),
        }
    }

    fn executor() -> Executor {
        Executor::new(Arc::new(EventBus::default()))
    }

    fn missing(questions: &[&str]) -> Vec<String> {
        questions.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn successful_action_merges_observations_and_tokens() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![action(
            "pdf_extract",
            "What are the brand colours?",
            json!({"path": "brand.pdf"}),
        )]);

        let report = executor()
            .execute(
                "req-1",
                1,
                &plan,
                &missing(&["What are the brand colours?"]),
                &mut registry,
                500_000,
            )
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0].succeeded());
        assert!(report.tokens_spent > 0);
        assert!(report
            .observations
            .iter()
            .any(|(key, _)| key == "brand_primary"));
        assert_eq!(report.questions_answered, 1);
        assert_eq!(report.questions_attempted, 1);
        assert_eq!(registry.usage().calls_made(ToolName::PdfExtract), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_dropped_not_fatal() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![
            action("crystal_ball", "What does the client want?", json!({})),
            action("web_search", "What are typical hours?", json!({"query": "hours"})),
        ]);

        let report = executor()
            .execute(
                "req-1",
                1,
                &plan,
                &missing(&["What does the client want?", "What are typical hours?"]),
                &mut registry,
                500_000,
            )
            .await;

        assert!(matches!(
            report.outcomes[0].status,
            ActionStatus::SkippedUnknownTool { .. }
        ));
        assert!(report.outcomes[1].succeeded());
    }

    #[tokio::test]
    async fn exhausted_budget_drops_action() {
        let mut registry = default_registry(Duration::from_secs(30));
        let audit = action("seo_audit", "How is the SEO?", json!({"url": "https://example.com"}));
        let plan = plan(vec![audit.clone(), audit]);

        let report = executor()
            .execute("req-1", 1, &plan, &missing(&["How is the SEO?"]), &mut registry, 500_000)
            .await;

        // seo_audit has budget 1: first runs, second is dropped pre-dispatch.
        assert!(report.outcomes[0].succeeded());
        assert!(matches!(report.outcomes[1].status, ActionStatus::SkippedBudget));
        assert_eq!(registry.usage().calls_made(ToolName::SeoAudit), 1);
    }

    #[tokio::test]
    async fn token_ceiling_stops_remaining_actions() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![
            action("seo_audit", "How is the SEO?", json!({"url": "https://example.com"})),
            action("web_search", "q2", json!({"query": "anything"})),
        ]);

        // seo_audit costs 12k; the ceiling is 10k, so it overshoots once
        // and everything after is skipped.
        let report = executor()
            .execute(
                "req-1",
                1,
                &plan,
                &missing(&["How is the SEO?", "q2"]),
                &mut registry,
                10_000,
            )
            .await;

        assert!(report.outcomes[0].succeeded());
        assert_eq!(report.tokens_spent, 12_000);
        assert!(matches!(report.outcomes[1].status, ActionStatus::SkippedTokenBudget));
        assert_eq!(registry.usage().calls_made(ToolName::WebSearch), 0);
    }

    #[tokio::test]
    async fn invalid_params_fail_only_their_action() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![
            action("fetch_page", "q1", json!({})), // missing url
            action("fetch_page", "q2", json!({"url": "https://example.com"})),
        ]);

        let report = executor()
            .execute("req-1", 1, &plan, &missing(&["q1", "q2"]), &mut registry, 500_000)
            .await;

        assert!(matches!(
            &report.outcomes[0].status,
            ActionStatus::Failed { kind, .. } if kind == "invalid_input"
        ));
        assert!(report.outcomes[1].succeeded());
        // The failed parse never consumed a budget slot.
        assert_eq!(registry.usage().calls_made(ToolName::FetchPage), 1);
    }

    #[tokio::test]
    async fn tool_validation_rejection_refunds_budget() {
        let mut registry = default_registry(Duration::from_secs(30));
        // Valid shape, but the tool body rejects the scheme pre-execution
        // and the registry refunds the slot.
        let plan = plan(vec![action("fetch_page", "q", json!({"url": "notaurl"}))]);

        let report = executor()
            .execute("req-1", 1, &plan, &missing(&["q"]), &mut registry, 500_000)
            .await;

        assert!(matches!(&report.outcomes[0].status, ActionStatus::Failed { .. }));
        assert_eq!(registry.usage().calls_made(ToolName::FetchPage), 0);
    }

    #[tokio::test]
    async fn empty_plan_yields_empty_report() {
        let mut registry = default_registry(Duration::from_secs(30));
        let report = executor()
            .execute("req-1", 1, &EnrichmentPlan::empty(), &[], &mut registry, 500_000)
            .await;
        assert!(report.outcomes.is_empty());
        assert_eq!(report.tokens_spent, 0);
        assert_eq!(report.questions_attempted, 0);
    }

    #[tokio::test]
    async fn invented_question_is_dropped_unanswered() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![
            // Not in the missing list: the Planner made this gap up.
            action("maps_lookup", "What is the CEO's favourite colour?", json!({"business_name": "Acme"})),
            action("web_search", "What are the opening hours?", json!({"query": "acme opening hours"})),
        ]);

        let report = executor()
            .execute(
                "req-1",
                1,
                &plan,
                &missing(&["What are the opening hours?"]),
                &mut registry,
                500_000,
            )
            .await;

        assert!(matches!(report.outcomes[0].status, ActionStatus::SkippedUnknownQuestion));
        assert_eq!(registry.usage().calls_made(ToolName::MapsLookup), 0);
        // Nothing from the dropped action leaked into the observations.
        assert!(report.observations.iter().all(|(key, _)| !key.starts_with("business_")));
        assert!(report.outcomes[1].succeeded());
    }

    #[tokio::test]
    async fn question_match_tolerates_cosmetic_rewording() {
        let mut registry = default_registry(Duration::from_secs(30));
        let plan = plan(vec![action(
            "web_search",
            "what are the OPENING hours?!",
            json!({"query": "hours"}),
        )]);

        let report = executor()
            .execute(
                "req-1",
                1,
                &plan,
                &missing(&["What are the opening hours?"]),
                &mut registry,
                500_000,
            )
            .await;

        assert!(report.outcomes[0].succeeded());
    }
}
