//! LLM-backed validator and classifier.
//!
//! The model's raw `complete` claim is gated by the iteration's
//! confidence threshold: early passes demand near-certainty, later
//! passes accept a competent-developer-could-proceed standard. The
//! threshold curve is configuration, not code.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use scopehound_core::{
    Message, Provider, ProviderRequest, RequestCategory, ValidationContext, Validator,
    ValidatorError, Verdict,
};

use crate::extract_json;
use crate::prompts::{validator_user_message, VALIDATOR_SYSTEM};

/// Raw classifier output before category normalization and gating.
#[derive(Debug, Deserialize)]
struct ClassificationResult {
    primary_category: String,
    #[serde(default)]
    subcategories: Vec<String>,
    complete: bool,
    #[serde(default)]
    missing: Vec<String>,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

pub struct LlmValidator {
    provider: Arc<dyn Provider>,
    model: String,
    /// Required confidence to pass, indexed by iteration (clamped to last).
    thresholds: [f64; 4],
}

impl LlmValidator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        thresholds: [f64; 4],
    ) -> Self {
        Self { provider, model: model.into(), thresholds }
    }

    fn threshold_for(&self, iteration: u32) -> f64 {
        let idx = (iteration as usize).min(self.thresholds.len() - 1);
        self.thresholds[idx]
    }

    fn parse(content: &str) -> Result<ClassificationResult, ValidatorError> {
        let json = extract_json(content)
            .ok_or_else(|| ValidatorError::InvalidOutput("no JSON object in response".into()))?;
        serde_json::from_str(json).map_err(|e| ValidatorError::InvalidOutput(e.to_string()))
    }
}

#[async_trait]
impl Validator for LlmValidator {
    async fn validate(&self, ctx: ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(VALIDATOR_SYSTEM),
                Message::user(validator_user_message(&ctx)),
            ],
            temperature: 0.0,
            max_tokens: Some(1_024),
        };

        let response = self.provider.complete(request).await?;

        let parsed = match Self::parse(&response.message.content) {
            Ok(parsed) => parsed,
            Err(e) => {
                // The caller retries once; the fallback classification only
                // exists for the log line.
                warn!(
                    iteration = ctx.iteration,
                    fallback = %crate::prompts::parse_fallback_category(),
                    error = %e,
                    "Validator output invalid"
                );
                return Err(e);
            }
        };

        let category = RequestCategory::parse_lenient(&parsed.primary_category);
        let confidence = parsed.confidence.clamp(0.0, 1.0);
        let threshold = self.threshold_for(ctx.iteration);
        let complete = parsed.complete && confidence >= threshold;

        debug!(
            iteration = ctx.iteration,
            category = %category,
            raw_complete = parsed.complete,
            confidence,
            threshold,
            gated_complete = complete,
            "Validator pass"
        );

        Ok(Verdict {
            complete,
            missing: parsed.missing,
            confidence,
            category,
            subcategories: parsed.subcategories,
            reasoning: parsed.reasoning,
        })
    }
}
