//! Scripted provider — returns canned responses in sequence.
//!
//! The planner and validator agents are tested against this double: each
//! `complete()` call pops the next scripted response, so a test can walk
//! an agent through a multi-pass conversation deterministically.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use scopehound_core::{
    Message, Provider, ProviderError, ProviderRequest, ProviderResponse, Usage,
};

/// A provider that replays a fixed sequence of responses.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    /// Tokens reported per call.
    usage_per_call: Usage,
}

impl ScriptedProvider {
    /// Replay the given responses in order; calls past the end fail with
    /// a network error (a test that over-calls should fail loudly).
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            usage_per_call: Usage {
                prompt_tokens: 500,
                completion_tokens: 200,
                total_tokens: 700,
            },
        }
    }

    /// A provider that always returns the same single response.
    pub fn single(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Override the usage reported per call.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage_per_call = usage;
        self
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let next = self
            .responses
            .lock()
            .map_err(|_| ProviderError::Network("scripted provider poisoned".into()))?
            .pop_front();

        match next {
            Some(content) => Ok(ProviderResponse {
                message: Message::assistant(content),
                usage: Some(self.usage_per_call),
                model: "scripted-model".into(),
            }),
            None => Err(ProviderError::Network("script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "scripted-model".into(),
            messages: vec![Message::user("hi")],
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn replays_in_order_then_exhausts() {
        let provider = ScriptedProvider::new(vec!["first".into(), "second".into()]);

        let a = provider.complete(request()).await.unwrap();
        assert_eq!(a.message.content, "first");
        let b = provider.complete(request()).await.unwrap();
        assert_eq!(b.message.content, "second");
        assert_eq!(provider.remaining(), 0);

        let err = provider.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }

    #[tokio::test]
    async fn reports_configured_usage() {
        let provider = ScriptedProvider::single("x").with_usage(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }
}
