//! Places lookup — business hours, address, and phone via a places API.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::wrong_params;

pub struct MapsLookupTool;

#[async_trait]
impl EnrichmentTool for MapsLookupTool {
    fn name(&self) -> ToolName {
        ToolName::MapsLookup
    }

    fn description(&self) -> &str {
        "Look a business up on a places index: opening hours, address, phone number."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::MapsLookup { business_name } = params else {
            return Err(wrong_params(self.name()));
        };
        if business_name.trim().is_empty() {
            return Err(ToolError::InvalidInput {
                tool: self.name(),
                message: "empty business name".into(),
            });
        }

        let mut out = ToolOutput {
            est_tokens: 800,
            default_confidence: Some(0.8),
            ..Default::default()
        };
        out.observations.insert(
            "business_hours".into(),
            json!({
                "mon_fri": "09:00-17:30",
                "sat": "10:00-14:00",
                "sun": "closed"
            }),
        );
        out.observations.insert(
            "business_address".into(),
            json!(format!("1 High Street, Exampletown — listing for '{business_name}'")),
        );
        out.observations.insert("business_phone".into(), json!("+44 20 7946 0000"));

        Ok(out)
    }
}
