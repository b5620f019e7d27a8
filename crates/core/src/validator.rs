//! Validator trait — the engine's only arbiter of completeness.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::category::RequestCategory;
use crate::context::DynamicContext;
use crate::error::ValidatorError;
use crate::request::FileSummary;
use crate::state::IterationRecord;

/// Everything a Validator pass may consider.
pub struct ValidationContext<'a> {
    pub raw_request: &'a str,
    pub static_summary: &'a str,
    pub website_content: Option<&'a str>,
    pub file_summaries: &'a [FileSummary],
    /// Observations gathered by earlier enrichment passes.
    pub dynamic_context: &'a DynamicContext,
    /// Prior iteration records, so the Validator does not re-request
    /// information already sought.
    pub history: &'a [IterationRecord],
    /// 0 for the initial pass, then the enrichment iteration just run.
    pub iteration: u32,
}

/// The structured result of one validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether a competent developer could proceed from here. Already
    /// gated by the iteration's confidence threshold.
    pub complete: bool,

    /// Still-missing information, phrased as questions to the client.
    pub missing: Vec<String>,

    /// Classifier confidence in [0, 1].
    pub confidence: f64,

    pub category: RequestCategory,

    #[serde(default)]
    pub subcategories: Vec<String>,

    /// Brief explanation of the classification decision.
    #[serde(default)]
    pub reasoning: String,
}

/// Classifies a request and decides whether enough context exists to
/// write a correct technical plan.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, ctx: ValidationContext<'_>) -> Result<Verdict, ValidatorError>;
}
