//! Per-request enrichment state: iteration ledger, budgets, stop reason.
//!
//! The state is owned by the Loop Driver and threaded through the
//! iteration fold; Planner, Executor, and Validator only ever read it.
//! `iteration` advances exactly once per enrichment round, and
//! `stop_reason` is written exactly once, on the terminal transition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::RequestCategory;
use crate::context::DynamicContext;
use crate::plan::EnrichmentPlan;
use crate::tool::{ToolName, ToolParams};

/// Why the engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Complete,
    Unclear,
    MaxIterations,
    TokenLimit,
    NoProgress,
    ValidatorParseError,
    Deadline,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Unclear => "unclear",
            Self::MaxIterations => "max_iterations",
            Self::TokenLimit => "token_limit",
            Self::NoProgress => "no_progress",
            Self::ValidatorParseError => "validator_parse_error",
            Self::Deadline => "deadline",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-tool call ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBudget {
    pub calls_made: u32,
    pub max_calls: u32,
}

impl CallBudget {
    pub fn remaining(&self) -> u32 {
        self.max_calls.saturating_sub(self.calls_made)
    }
}

/// The per-request usage table across all nine tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsage {
    entries: BTreeMap<ToolName, CallBudget>,
}

impl ToolUsage {
    /// Usage table with the built-in budget per tool.
    pub fn with_defaults() -> Self {
        let entries = ToolName::ALL
            .into_iter()
            .map(|t| (t, CallBudget { calls_made: 0, max_calls: t.default_budget() }))
            .collect();
        Self { entries }
    }

    /// Usage table with overridden budgets; tools absent from the override
    /// map keep their defaults.
    pub fn with_budgets(budgets: &BTreeMap<ToolName, u32>) -> Self {
        let entries = ToolName::ALL
            .into_iter()
            .map(|t| {
                let max_calls = budgets.get(&t).copied().unwrap_or_else(|| t.default_budget());
                (t, CallBudget { calls_made: 0, max_calls })
            })
            .collect();
        Self { entries }
    }

    pub fn has_budget(&self, tool: ToolName) -> bool {
        self.remaining(tool) > 0
    }

    pub fn remaining(&self, tool: ToolName) -> u32 {
        self.entries.get(&tool).map(CallBudget::remaining).unwrap_or(0)
    }

    pub fn calls_made(&self, tool: ToolName) -> u32 {
        self.entries.get(&tool).map(|b| b.calls_made).unwrap_or(0)
    }

    pub fn max_calls(&self, tool: ToolName) -> u32 {
        self.entries.get(&tool).map(|b| b.max_calls).unwrap_or(0)
    }

    /// Commit one call against the tool's budget.
    pub fn record_call(&mut self, tool: ToolName) {
        if let Some(budget) = self.entries.get_mut(&tool) {
            budget.calls_made += 1;
        }
    }

    /// Return a committed slot (timeout or pre-execution validation failure).
    pub fn refund_call(&mut self, tool: ToolName) {
        if let Some(budget) = self.entries.get_mut(&tool) {
            budget.calls_made = budget.calls_made.saturating_sub(1);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ToolName, &CallBudget)> {
        self.entries.iter()
    }
}

impl Default for ToolUsage {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// What happened to one planned action when the Executor ran it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ActionStatus {
    /// Tool ran; observations merged into the dynamic context.
    Completed { keys: Vec<String> },
    /// Tool ran (or was cut off) and reported a failure.
    Failed { kind: String, message: String },
    /// Dropped before dispatch: the named tool had no remaining budget.
    SkippedBudget,
    /// Dropped before dispatch: the Planner named a tool we don't have.
    SkippedUnknownTool { name: String },
    /// Dropped before dispatch: the action targeted a question that is not
    /// in the outstanding missing list.
    SkippedUnknownQuestion,
    /// Dropped before dispatch: the global token budget was already crossed.
    SkippedTokenBudget,
}

/// One dispatched (or dropped) action within an iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub tool: Option<ToolName>,
    /// The missing question the Planner claimed this action answers.
    pub question: String,
    pub params: Option<ToolParams>,
    pub status: ActionStatus,
    pub tokens: u64,
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ActionStatus::Completed { .. })
    }
}

/// Snapshot of one full enrichment pass (Planner → Executor → Validator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based within the enrichment loop.
    pub iteration: u32,
    pub plan: EnrichmentPlan,
    pub actions: Vec<ActionOutcome>,
    pub tokens_used: u64,
    pub missing_before: Vec<String>,
    pub missing_after: Vec<String>,
    /// Keys added or updated in the dynamic context this pass.
    pub observations_added: Vec<String>,
    /// Summary confidence for the pass: answer rate and mean answer
    /// confidence, weighted 60/40.
    pub confidence: f64,
}

impl IterationRecord {
    /// Per-pass summary confidence.
    pub fn summary_confidence(
        answered: usize,
        attempted: usize,
        mean_answer_confidence: f64,
    ) -> f64 {
        if attempted == 0 {
            return 0.0;
        }
        let answer_rate = answered as f64 / attempted as f64;
        let raw = answer_rate * 0.6 + mean_answer_confidence * 0.4;
        (raw * 100.0).round() / 100.0
    }
}

/// The full per-request record. Created at iteration 0, mutated only by
/// the Loop Driver and Validator results, destroyed on handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentState {
    pub iteration: u32,
    pub history: Vec<IterationRecord>,
    pub dynamic_context: DynamicContext,
    pub tool_usage: ToolUsage,
    pub tokens_used: u64,
    pub token_budget: u64,
    pub stop_reason: Option<StopReason>,
    pub last_missing: Vec<String>,
    pub last_confidence: f64,
    pub category: RequestCategory,
    pub subcategories: Vec<String>,
}

impl EnrichmentState {
    pub fn new(token_budget: u64, tool_usage: ToolUsage) -> Self {
        Self {
            iteration: 0,
            history: Vec::new(),
            dynamic_context: DynamicContext::new(),
            tool_usage,
            tokens_used: 0,
            token_budget,
            stop_reason: None,
            last_missing: Vec::new(),
            last_confidence: 0.0,
            category: RequestCategory::Unclear,
            subcategories: Vec::new(),
        }
    }

    /// Mark the terminal transition. Only the first call takes effect;
    /// the stop reason is written exactly once per run.
    pub fn stop(&mut self, reason: StopReason) {
        debug_assert!(self.stop_reason.is_none(), "stop_reason set twice");
        if self.stop_reason.is_none() {
            self.stop_reason = Some(reason);
        }
    }

    pub fn over_token_budget(&self) -> bool {
        self.tokens_used >= self.token_budget
    }

    pub fn remaining_tokens(&self) -> u64 {
        self.token_budget.saturating_sub(self.tokens_used)
    }

    /// Questions missing at the initial validation pass. The denominator
    /// of the answer-rate metric.
    pub fn initial_missing(&self) -> &[String] {
        self.history
            .first()
            .map(|r| r.missing_before.as_slice())
            .unwrap_or(&self.last_missing)
    }

    /// Fraction of initially-missing questions resolved by enrichment,
    /// 0.0 when nothing was missing to begin with.
    pub fn answer_rate(&self) -> f64 {
        let initial = self.initial_missing().len();
        if initial == 0 {
            return 0.0;
        }
        let resolved = initial.saturating_sub(self.last_missing.len());
        resolved as f64 / initial as f64
    }
}

/// Normalize a missing-question string for set comparison: lower-cased,
/// punctuation stripped, whitespace collapsed. The Validator may paraphrase
/// between passes; this is the floor that keeps cosmetic rewording from
/// masquerading as progress.
pub fn normalize_question(question: &str) -> String {
    let lowered = question.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The normalized question set used for progress comparison.
pub fn normalized_set(questions: &[String]) -> std::collections::BTreeSet<String> {
    questions
        .iter()
        .map(|q| normalize_question(q))
        .filter(|q| !q.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reason_serializes_snake_case() {
        let json = serde_json::to_string(&StopReason::MaxIterations).unwrap();
        assert_eq!(json, "\"max_iterations\"");
        assert_eq!(StopReason::ValidatorParseError.to_string(), "validator_parse_error");
    }

    #[test]
    fn usage_defaults_match_budget_table() {
        let usage = ToolUsage::with_defaults();
        assert_eq!(usage.max_calls(ToolName::FetchPage), 5);
        assert_eq!(usage.max_calls(ToolName::SeoAudit), 1);
        assert_eq!(usage.remaining(ToolName::PdfExtract), 2);
    }

    #[test]
    fn usage_override_keeps_unlisted_defaults() {
        let mut budgets = BTreeMap::new();
        budgets.insert(ToolName::WebSearch, 0);
        let usage = ToolUsage::with_budgets(&budgets);
        assert!(!usage.has_budget(ToolName::WebSearch));
        assert_eq!(usage.max_calls(ToolName::FetchPage), 5);
    }

    #[test]
    fn record_and_refund_roundtrip() {
        let mut usage = ToolUsage::with_defaults();
        usage.record_call(ToolName::FormDetect);
        assert_eq!(usage.calls_made(ToolName::FormDetect), 1);
        usage.refund_call(ToolName::FormDetect);
        assert_eq!(usage.calls_made(ToolName::FormDetect), 0);
        // refund never underflows
        usage.refund_call(ToolName::FormDetect);
        assert_eq!(usage.calls_made(ToolName::FormDetect), 0);
    }

    #[test]
    fn stop_is_sticky() {
        let mut state = EnrichmentState::new(500_000, ToolUsage::with_defaults());
        state.stop(StopReason::NoProgress);
        assert_eq!(state.stop_reason, Some(StopReason::NoProgress));
    }

    #[test]
    fn answer_rate_from_initial_to_final() {
        let mut state = EnrichmentState::new(500_000, ToolUsage::with_defaults());
        state.history.push(IterationRecord {
            iteration: 1,
            plan: EnrichmentPlan::empty(),
            actions: vec![],
            tokens_used: 0,
            missing_before: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            missing_after: vec!["a".into(), "b".into()],
            observations_added: vec![],
            confidence: 0.0,
        });
        state.last_missing = vec!["a".into()];
        assert!((state.answer_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn answer_rate_zero_when_nothing_missing() {
        let state = EnrichmentState::new(500_000, ToolUsage::with_defaults());
        assert_eq!(state.answer_rate(), 0.0);
    }

    #[test]
    fn summary_confidence_weighting() {
        // 2 of 4 answered at mean confidence 0.8 → 0.5*0.6 + 0.8*0.4 = 0.62
        let c = IterationRecord::summary_confidence(2, 4, 0.8);
        assert!((c - 0.62).abs() < 1e-9);
        assert_eq!(IterationRecord::summary_confidence(0, 0, 1.0), 0.0);
    }

    #[test]
    fn question_normalization_strips_cosmetics() {
        assert_eq!(
            normalize_question("  What are the brand COLOURS?! "),
            "what are the brand colours"
        );
        let a = vec!["What fonts?".to_string(), "Which pages??".to_string()];
        let b = vec!["which pages".to_string(), "what fonts!".to_string()];
        assert_eq!(normalized_set(&a), normalized_set(&b));
    }
}
