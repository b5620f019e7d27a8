//! Dynamic context — observations accumulated by tools during enrichment.
//!
//! The map grows monotonically across iterations: keys are append-only,
//! and a value is replaced only by a later observation with strictly
//! higher confidence (equal confidence defers to the more recent
//! iteration). Enrichment never forgets what it has learned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tool::ToolName;

/// A single observed fact, keyed by semantic name in [`DynamicContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// The observed value (string, list, number — whatever the tool saw).
    pub value: serde_json::Value,

    /// Which tool produced this observation.
    pub source_tool: ToolName,

    /// Confidence in [0, 1], per observation rather than per call.
    pub confidence: f64,

    /// Enrichment iteration (1-based) the observation was recorded in.
    pub iteration: u32,
}

/// Observations keyed by semantic name (`about_page_url`,
/// `existing_form_fields`, `business_hours`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicContext {
    entries: BTreeMap<String, Observation>,
}

impl DynamicContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation. Returns `true` when the entry was added or
    /// replaced, `false` when an existing higher-confidence value won.
    pub fn record(&mut self, key: impl Into<String>, observation: Observation) -> bool {
        let key = key.into();
        match self.entries.get(&key) {
            None => {
                self.entries.insert(key, observation);
                true
            }
            Some(existing) => {
                let wins = observation.confidence > existing.confidence
                    || (observation.confidence == existing.confidence
                        && observation.iteration >= existing.iteration);
                if wins {
                    self.entries.insert(key, observation);
                }
                wins
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Observation> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Observation)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean observation confidence, 0.0 when empty. Feeds the
    /// `final_enrichment_confidence` metric.
    pub fn mean_confidence(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.entries.values().map(|o| o.confidence).sum();
        sum / self.entries.len() as f64
    }
}
