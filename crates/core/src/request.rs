//! Run input — the fully populated record the engine is entered with.
//!
//! Upstream collaborators (static enrichment, website rendering, file
//! extraction) have already run by the time a `RunInput` exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::ensure_url_with_protocol;
use crate::tool::ToolName;

/// A client-supplied file attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    pub filename: String,
    /// Local path the extraction adapters downloaded the file to.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Per-file extract summary produced by the upstream file processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub filename: String,
    /// File kind as detected upstream ("pdf", "image", "docx", ...).
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Optional per-request configuration overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_budgets: Option<BTreeMap<ToolName, u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_thresholds: Option<[f64; 4]>,
}

/// The inbound record. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    pub request_id: String,

    /// Bare domain, lower-case, no scheme. See `domain::sanitize_domain`.
    pub client_id: String,

    pub raw_request: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    #[serde(default)]
    pub attachments: Vec<FileAttachment>,

    /// Client profile key-value pairs from the static enrichment step.
    #[serde(default)]
    pub static_context: BTreeMap<String, serde_json::Value>,

    /// Rendered website content summary, when the site was reachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_content: Option<String>,

    #[serde(default)]
    pub file_summaries: Vec<FileSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineOverrides>,
}

impl RunInput {
    /// The URL tools should target: the explicit website URL when present,
    /// otherwise the client domain promoted to a URL. `None` when neither
    /// yields anything usable.
    pub fn effective_website_url(&self) -> Option<String> {
        if let Some(url) = &self.website_url {
            if !url.trim().is_empty() {
                return Some(ensure_url_with_protocol(url));
            }
        }
        if self.client_id.trim().is_empty() {
            return None;
        }
        Some(ensure_url_with_protocol(&self.client_id))
    }

    /// Static context rendered for prompts, truncated so profile blobs
    /// don't crowd out the request itself.
    pub fn static_summary(&self, max_len: usize) -> String {
        let mut parts: Vec<String> = self
            .static_context
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_value(v)))
            .collect();
        if parts.is_empty() {
            parts.push("(no client profile data)".to_string());
        }
        let summary = parts.join("\n");
        if summary.chars().count() > max_len {
            let mut truncated: String = summary.chars().take(max_len).collect();
            truncated.push('…');
            return truncated;
        }
        summary
    }

    /// File extracts rendered for prompts.
    pub fn file_context(&self) -> String {
        if self.file_summaries.is_empty() {
            return "No files attached.".to_string();
        }
        self.file_summaries
            .iter()
            .map(|fs| match (&fs.error, &fs.text) {
                (Some(err), _) => format!("- {} ({}): extraction failed: {err}", fs.filename, fs.kind),
                (None, Some(text)) => {
                    let preview: String = text.chars().take(500).collect();
                    let ellipsis = if text.chars().count() > 500 { "…" } else { "" };
                    format!("- {} ({}): {preview}{ellipsis}", fs.filename, fs.kind)
                }
                (None, None) => format!("- {} ({}): no text extracted", fs.filename, fs.kind),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
