//! Web search tool — general-web factual search.
//!
//! The stub returns context-aware results for common topics and a generic
//! fallback otherwise, in the shape of a top result plus a result list.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::wrong_params;

pub struct WebSearchTool;

#[async_trait]
impl EnrichmentTool for WebSearchTool {
    fn name(&self) -> ToolName {
        ToolName::WebSearch
    }

    fn description(&self) -> &str {
        "Search the web for factual information. Returns relevant results with titles, URLs, and snippets."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::WebSearch { query } = params else {
            return Err(wrong_params(self.name()));
        };
        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput {
                tool: self.name(),
                message: "empty search query".into(),
            });
        }

        let results = generate_results(query);

        let mut out = ToolOutput {
            est_tokens: 900,
            default_confidence: Some(0.6),
            ..Default::default()
        };

        if let Some(top) = results.first() {
            out.observations.insert(
                "search_top_result".into(),
                json!(format!("{}: {}", top.title, top.snippet)),
            );
            out.observations
                .insert("search_source_url".into(), json!(top.url));
        }
        out.observations.insert(
            "search_results".into(),
            serde_json::to_value(&results).unwrap_or_default(),
        );

        Ok(out)
    }
}

#[derive(Serialize, Clone)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn generate_results(query: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    if q.contains("opening hours") || q.contains("business hours") {
        return vec![SearchResult {
            title: "Opening hours directory".into(),
            url: "https://hours.example.org/listing".into(),
            snippet: "Typical listed hours: Mon-Fri 9:00-17:30, Sat 10:00-14:00.".into(),
        }];
    }

    if q.contains("seo") {
        return vec![SearchResult {
            title: "On-page SEO checklist".into(),
            url: "https://seo.example.org/checklist".into(),
            snippet: "Titles under 60 characters, one H1 per page, descriptive alt text.".into(),
        }];
    }

    vec![
        SearchResult {
            title: format!("Result 1 for: {query}"),
            url: format!("https://search.example.org/?q={}", urlencode(query)),
            snippet: format!("General web result for the query '{query}'."),
        },
        SearchResult {
            title: format!("Result 2 for: {query}"),
            url: format!("https://search.example.org/?q={}&p=2", urlencode(query)),
            snippet: "A second, less specific match.".into(),
        },
    ]
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "+")
}
