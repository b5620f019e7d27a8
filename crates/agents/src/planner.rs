//! LLM-backed planner.
//!
//! Asks the model for a JSON plan over the outstanding questions and the
//! tools that still have budget. The output is advisory — the Executor
//! re-validates every action — so parsing is the only hard failure mode
//! here, and even that only costs the iteration.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use scopehound_core::{
    EnrichmentPlan, Message, Planner, PlannerError, PlanningContext, Provider, ProviderRequest,
};

use crate::extract_json;
use crate::prompts::{planner_user_message, PLANNER_SYSTEM};

pub struct LlmPlanner {
    provider: Arc<dyn Provider>,
    model: String,
}

impl LlmPlanner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }

    fn parse_plan(content: &str) -> Result<EnrichmentPlan, PlannerError> {
        let json = extract_json(content)
            .ok_or_else(|| PlannerError::InvalidOutput("no JSON object in response".into()))?;
        serde_json::from_str(json).map_err(|e| PlannerError::InvalidOutput(e.to_string()))
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, ctx: PlanningContext<'_>) -> Result<EnrichmentPlan, PlannerError> {
        if ctx.missing.is_empty() || ctx.available_tools.is_empty() {
            // Nothing to plan for; an empty plan still counts as a pass.
            return Ok(EnrichmentPlan::empty());
        }

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(PLANNER_SYSTEM),
                Message::user(planner_user_message(&ctx)),
            ],
            temperature: 0.0,
            max_tokens: Some(2_048),
        };

        let response = self.provider.complete(request).await?;
        let plan = Self::parse_plan(&response.message.content).map_err(|e| {
            warn!(iteration = ctx.iteration, error = %e, "Planner output invalid");
            e
        })?;

        debug!(
            iteration = ctx.iteration,
            actions = plan.actions.len(),
            estimated_tokens = plan.estimated_tokens,
            "Enrichment plan created"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopehound_core::{DynamicContext, ToolAvailability, ToolName};
    use scopehound_providers::ScriptedProvider;

    fn tools() -> Vec<ToolAvailability> {
        vec![ToolAvailability {
            name: ToolName::PdfExtract,
            description: "Extract from PDFs".into(),
            remaining_calls: 2,
            max_calls: 2,
        }]
    }

    fn ctx<'a>(
        missing: &'a [String],
        available: &'a [ToolAvailability],
        dynamic_context: &'a DynamicContext,
    ) -> PlanningContext<'a> {
        PlanningContext {
            raw_request: "Update branding",
            static_summary: "(no client profile data)",
            website_url: Some("https://example.com"),
            missing,
            available_tools: available,
            dynamic_context,
            iteration: 1,
        }
    }

    #[tokio::test]
    async fn parses_a_well_formed_plan() {
        let provider = Arc::new(ScriptedProvider::single(
            r#"```json
{
  "actions": [
    {"tool": "pdf_extract", "question": "What are the brand colours?",
     "params": {"path": "brand.pdf"}, "rationale": "brand kit attached"}
  ],
  "estimated_tokens": 2500,
  "strategy": "Extract brand details from the attached PDF"
}
```"#,
        ));
        let planner = LlmPlanner::new(provider, "scripted-model");

        let missing = vec!["What are the brand colours?".to_string()];
        let available = tools();
        let dynamic_context = DynamicContext::new();

        let plan = planner
            .plan(ctx(&missing, &available, &dynamic_context))
            .await
            .unwrap();
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].tool, "pdf_extract");
        assert_eq!(plan.estimated_tokens, 2500);
    }

    #[tokio::test]
    async fn unparseable_output_is_invalid() {
        let provider = Arc::new(ScriptedProvider::single("I would fetch the site first."));
        let planner = LlmPlanner::new(provider, "scripted-model");

        let missing = vec!["q".to_string()];
        let available = tools();
        let dynamic_context = DynamicContext::new();

        let err = planner
            .plan(ctx(&missing, &available, &dynamic_context))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn no_questions_short_circuits_to_empty_plan() {
        // Script is never consumed: with nothing missing there is no LLM call.
        let provider = Arc::new(ScriptedProvider::single("unused"));
        let planner = LlmPlanner::new(provider.clone(), "scripted-model");

        let missing: Vec<String> = vec![];
        let available = tools();
        let dynamic_context = DynamicContext::new();

        let plan = planner
            .plan(ctx(&missing, &available, &dynamic_context))
            .await
            .unwrap();
        assert!(plan.is_empty());
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn no_available_tools_short_circuits_to_empty_plan() {
        let provider = Arc::new(ScriptedProvider::single("unused"));
        let planner = LlmPlanner::new(provider.clone(), "scripted-model");

        let missing = vec!["q".to_string()];
        let available: Vec<ToolAvailability> = vec![];
        let dynamic_context = DynamicContext::new();

        let plan = planner
            .plan(ctx(&missing, &available, &dynamic_context))
            .await
            .unwrap();
        assert!(plan.is_empty());
        assert_eq!(provider.remaining(), 1);
    }
}
