//! Page fetcher — retrieves and summarizes a single web page.
//!
//! The stub derives a deterministic summary from the URL so plans that
//! fetch two different pages produce two different observations.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::{require_http_url, wrong_params};

pub struct FetchPageTool;

#[async_trait]
impl EnrichmentTool for FetchPageTool {
    fn name(&self) -> ToolName {
        ToolName::FetchPage
    }

    fn description(&self) -> &str {
        "Retrieve a single web page and summarize its content, title, and main sections."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::FetchPage { url } = params else {
            return Err(wrong_params(self.name()));
        };
        require_http_url(self.name(), url)?;

        let path = url_path(url);
        let slug = if path.is_empty() { "home".to_string() } else { path.replace('/', "_") };

        let mut out = ToolOutput {
            est_tokens: 1_500,
            default_confidence: Some(0.75),
            ..Default::default()
        };

        out.observations.insert(
            format!("page_summary_{slug}"),
            json!(format!(
                "Fetched {url}: a content page with header navigation, a main section, and a footer."
            )),
        );
        out.observations
            .insert(format!("page_title_{slug}"), json!(page_title(&path)));

        // Pages often link their about page from the header; surface it
        // once per site so follow-up questions can target it.
        if path.is_empty() {
            out.observations.insert(
                "about_page_url".into(),
                json!(format!("{}/about", url.trim_end_matches('/'))),
            );
            out.confidence_by_key.insert("about_page_url".into(), 0.6);
        }

        Ok(out)
    }
}

fn url_path(url: &str) -> String {
    let without_scheme = url.splitn(2, "://").nth(1).unwrap_or(url);
    without_scheme
        .splitn(2, '/')
        .nth(1)
        .unwrap_or("")
        .trim_end_matches('/')
        .to_string()
}

fn page_title(path: &str) -> String {
    if path.is_empty() {
        return "Home".to_string();
    }
    let last = path.rsplit('/').next().unwrap_or(path);
    let mut title: Vec<String> = last
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if title.is_empty() {
        title.push("Page".to_string());
    }
    title.join(" ")
}
