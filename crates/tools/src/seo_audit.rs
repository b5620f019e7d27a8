//! SEO auditor — title/meta/H1/alt-coverage/broken-link audit for a site.
//!
//! This is the most expensive tool in the fleet: it walks the whole site,
//! so its token estimate dwarfs the others and its budget is 1.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::{require_http_url, wrong_params};

pub struct SeoAuditTool;

#[async_trait]
impl EnrichmentTool for SeoAuditTool {
    fn name(&self) -> ToolName {
        ToolName::SeoAudit
    }

    fn description(&self) -> &str {
        "Full-site SEO audit: titles, meta descriptions, H1 structure, image alt coverage, broken links."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::SeoAudit { url } = params else {
            return Err(wrong_params(self.name()));
        };
        require_http_url(self.name(), url)?;

        let mut out = ToolOutput {
            est_tokens: 12_000,
            default_confidence: Some(0.8),
            ..Default::default()
        };
        out.observations.insert("seo_title".into(), json!("Home | Example Site"));
        out.observations.insert(
            "seo_meta_description".into(),
            json!("Missing on 3 of 8 pages; present on the home page."),
        );
        out.observations.insert("seo_h1_count".into(), json!({"pages_with_one_h1": 6, "pages_with_none": 2}));
        out.observations.insert("seo_alt_coverage_pct".into(), json!(64));
        out.observations.insert("seo_broken_links".into(), json!(["/old-pricing", "/team/retired-member"]));
        out.observations.insert("seo_score".into(), json!(71));

        Ok(out)
    }
}
