//! Planner trait — decides which tools to call, never calls them.

use async_trait::async_trait;

use crate::context::DynamicContext;
use crate::error::PlannerError;
use crate::plan::EnrichmentPlan;
use crate::tool::ToolAvailability;

/// Everything a Planner may consider when proposing actions.
pub struct PlanningContext<'a> {
    pub raw_request: &'a str,
    pub static_summary: &'a str,
    pub website_url: Option<&'a str>,
    /// Questions still outstanding from the most recent Validator pass.
    pub missing: &'a [String],
    /// Tools with remaining budget; the Planner must not name others.
    pub available_tools: &'a [ToolAvailability],
    /// Observations gathered so far, for deduplication.
    pub dynamic_context: &'a DynamicContext,
    /// Enrichment iteration about to run (1-based).
    pub iteration: u32,
}

/// Produces an [`EnrichmentPlan`] for the outstanding questions.
///
/// The Planner is advisory: the Executor independently drops actions
/// naming unknown tools or tools at zero budget, so a misbehaving
/// implementation degrades to an empty plan rather than a fault.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, ctx: PlanningContext<'_>) -> Result<EnrichmentPlan, PlannerError>;
}
