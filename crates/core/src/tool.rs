//! Tool abstraction — the nine information-gathering capabilities.
//!
//! Tools are what let the engine fill gaps in a client request without
//! going back to the client: fetch a page, detect forms, pull brand colours
//! out of a PDF, look a business up on a places API.
//!
//! Tools vary wildly in their input shapes, so parameters are a tagged
//! variant per tool kind rather than a loose map; the Registry matches on
//! the variant and dispatches to the registered implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::error::ToolError;
use crate::state::ToolUsage;

/// Per-observation confidence when a tool reports none for a key.
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

/// The closed set of information-gathering tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    FetchPage,
    WebSearch,
    ImageProbe,
    PdfExtract,
    FormDetect,
    SocialFind,
    SeoAudit,
    MapsLookup,
    ReviewsLookup,
}

impl ToolName {
    /// All tools, in budget-table order.
    pub const ALL: [ToolName; 9] = [
        Self::FetchPage,
        Self::WebSearch,
        Self::ImageProbe,
        Self::PdfExtract,
        Self::FormDetect,
        Self::SocialFind,
        Self::SeoAudit,
        Self::MapsLookup,
        Self::ReviewsLookup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchPage => "fetch_page",
            Self::WebSearch => "web_search",
            Self::ImageProbe => "image_probe",
            Self::PdfExtract => "pdf_extract",
            Self::FormDetect => "form_detect",
            Self::SocialFind => "social_find",
            Self::SeoAudit => "seo_audit",
            Self::MapsLookup => "maps_lookup",
            Self::ReviewsLookup => "reviews_lookup",
        }
    }

    /// Default per-request call budget.
    pub fn default_budget(&self) -> u32 {
        match self {
            Self::FetchPage => 5,
            Self::WebSearch => 3,
            Self::ImageProbe => 3,
            Self::PdfExtract => 2,
            Self::FormDetect => 3,
            Self::SocialFind => 2,
            Self::SeoAudit => 1,
            Self::MapsLookup => 1,
            Self::ReviewsLookup => 1,
        }
    }

    /// Parse a tool name as emitted by the Planner. Returns `None` for
    /// unrecognized names — the Executor drops those actions rather than
    /// failing the plan.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed parameters, one variant per tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolParams {
    FetchPage { url: String },
    WebSearch { query: String },
    ImageProbe { path: String },
    PdfExtract { path: String },
    FormDetect { url: String },
    SocialFind { url: String },
    SeoAudit { url: String },
    MapsLookup { business_name: String },
    ReviewsLookup { business_name: String },
}

impl ToolParams {
    /// Which tool these parameters target.
    pub fn tool(&self) -> ToolName {
        match self {
            Self::FetchPage { .. } => ToolName::FetchPage,
            Self::WebSearch { .. } => ToolName::WebSearch,
            Self::ImageProbe { .. } => ToolName::ImageProbe,
            Self::PdfExtract { .. } => ToolName::PdfExtract,
            Self::FormDetect { .. } => ToolName::FormDetect,
            Self::SocialFind { .. } => ToolName::SocialFind,
            Self::SeoAudit { .. } => ToolName::SeoAudit,
            Self::MapsLookup { .. } => ToolName::MapsLookup,
            Self::ReviewsLookup { .. } => ToolName::ReviewsLookup,
        }
    }

    /// Build typed parameters from a tool name plus the loose JSON object
    /// the Planner emitted. The primary field differs by tool; aliases the
    /// planner commonly produces (`file_path` for `path`, `business` for
    /// `business_name`) are accepted.
    pub fn from_parts(
        tool: ToolName,
        params: &serde_json::Value,
    ) -> Result<Self, ToolError> {
        let get = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| params.get(*k).and_then(|v| v.as_str()))
                .map(|s| s.trim().to_string())
                .find(|s| !s.is_empty())
        };

        let missing = |field: &str| ToolError::InvalidInput {
            tool,
            message: format!("missing required parameter '{field}'"),
        };

        Ok(match tool {
            ToolName::FetchPage => Self::FetchPage {
                url: get(&["url"]).ok_or_else(|| missing("url"))?,
            },
            ToolName::WebSearch => Self::WebSearch {
                query: get(&["query", "q"]).ok_or_else(|| missing("query"))?,
            },
            ToolName::ImageProbe => Self::ImageProbe {
                path: get(&["path", "file_path"]).ok_or_else(|| missing("path"))?,
            },
            ToolName::PdfExtract => Self::PdfExtract {
                path: get(&["path", "file_path"]).ok_or_else(|| missing("path"))?,
            },
            ToolName::FormDetect => Self::FormDetect {
                url: get(&["url"]).ok_or_else(|| missing("url"))?,
            },
            ToolName::SocialFind => Self::SocialFind {
                url: get(&["url"]).ok_or_else(|| missing("url"))?,
            },
            ToolName::SeoAudit => Self::SeoAudit {
                url: get(&["url"]).ok_or_else(|| missing("url"))?,
            },
            ToolName::MapsLookup => Self::MapsLookup {
                business_name: get(&["business_name", "business", "name"])
                    .ok_or_else(|| missing("business_name"))?,
            },
            ToolName::ReviewsLookup => Self::ReviewsLookup {
                business_name: get(&["business_name", "business", "name"])
                    .ok_or_else(|| missing("business_name"))?,
            },
        })
    }
}

/// The uniform result envelope every tool returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Semantic key → observed value (e.g. `brand_primary` → `"#FF6B6B"`).
    pub observations: BTreeMap<String, serde_json::Value>,

    /// Per-key confidence where the tool can distinguish — one `pdf_extract`
    /// may yield colours at 0.95 and fonts at 0.80.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub confidence_by_key: BTreeMap<String, f64>,

    /// Call-level default confidence for keys without an entry above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_confidence: Option<f64>,

    /// Estimated tokens this call contributes to the request budget.
    pub est_tokens: u64,
}

impl ToolOutput {
    /// Confidence for a specific observation key, falling back to the
    /// call-level default and finally [`FALLBACK_CONFIDENCE`].
    pub fn confidence_for(&self, key: &str) -> f64 {
        self.confidence_by_key
            .get(key)
            .copied()
            .or(self.default_confidence)
            .unwrap_or(FALLBACK_CONFIDENCE)
    }
}

/// The core tool trait.
///
/// Each tool (fetch_page, form_detect, pdf_extract, ...) implements this
/// trait. Tools are registered in the ToolRegistry and invoked by the
/// Executor, never directly by the Planner.
#[async_trait]
pub trait EnrichmentTool: Send + Sync {
    /// Which tool this implements.
    fn name(&self) -> ToolName;

    /// A description of what this tool does (rendered into planner prompts).
    fn description(&self) -> &str;

    /// Run the tool with already-validated, typed parameters.
    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError>;
}

/// A tool the Planner may still schedule: name plus remaining budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAvailability {
    pub name: ToolName,
    pub description: String,
    pub remaining_calls: u32,
    pub max_calls: u32,
}

/// A registry of tools plus the per-request usage ledger.
///
/// One registry is created per request; its usage table is the
/// authoritative record that `calls_made` never exceeds `max_calls`.
/// Budget is committed before the underlying call, restored on timeout and
/// on pre-execution validation failure, and kept on tool-body failure —
/// a failed attempt counts.
pub struct ToolRegistry {
    tools: HashMap<ToolName, Box<dyn EnrichmentTool>>,
    usage: ToolUsage,
    timeout: Duration,
}

impl ToolRegistry {
    /// Create a registry with default budgets and the given per-call timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: HashMap::new(),
            usage: ToolUsage::with_defaults(),
            timeout,
        }
    }

    /// Override the per-tool budgets (request-level configuration).
    pub fn with_budgets(mut self, budgets: &BTreeMap<ToolName, u32>) -> Self {
        self.usage = ToolUsage::with_budgets(budgets);
        self
    }

    /// Override the per-call deadline (request-level configuration).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool implementation. Replaces any existing one.
    pub fn register(&mut self, tool: Box<dyn EnrichmentTool>) {
        self.tools.insert(tool.name(), tool);
    }

    /// Tools with remaining budget *and* a registered implementation.
    pub fn available_tools(&self) -> Vec<ToolAvailability> {
        ToolName::ALL
            .into_iter()
            .filter_map(|name| {
                let tool = self.tools.get(&name)?;
                let remaining = self.usage.remaining(name);
                if remaining == 0 {
                    return None;
                }
                Some(ToolAvailability {
                    name,
                    description: tool.description().to_string(),
                    remaining_calls: remaining,
                    max_calls: self.usage.max_calls(name),
                })
            })
            .collect()
    }

    /// The per-request usage ledger.
    pub fn usage(&self) -> &ToolUsage {
        &self.usage
    }

    /// Invoke a tool, enforcing budget and deadline.
    pub async fn invoke(&mut self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let name = params.tool();

        let tool = self
            .tools
            .get(&name)
            .ok_or(ToolError::NotRegistered(name))?;

        if !self.usage.has_budget(name) {
            return Err(ToolError::BudgetExhausted(name));
        }

        // Commit the budget slot before entering the tool body.
        self.usage.record_call(name);

        match tokio::time::timeout(self.timeout, tool.invoke(params)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => {
                // Pre-execution validation failures don't consume the slot.
                if matches!(err, ToolError::InvalidInput { .. }) {
                    self.usage.refund_call(name);
                }
                Err(err)
            }
            Err(_elapsed) => {
                self.usage.refund_call(name);
                Err(ToolError::Timeout {
                    tool: name,
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
