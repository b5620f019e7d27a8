//! Configuration loading, validation, and management for Scopehound.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides (`SCOPEHOUND_*`). Validates all settings at load time and
//! merges per-request overrides on top.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use scopehound_core::{EngineOverrides, ToolName};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Engine limits and thresholds.
    #[serde(default)]
    pub engine: EngineConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            provider: ProviderSettings::default(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("engine", &self.engine)
            .field("provider", &self.provider)
            .finish()
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Engine limits. Defaults match the hard limits in the loop driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap on enrichment passes.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Global per-request token ceiling.
    #[serde(default = "default_token_budget")]
    pub token_budget: u64,

    /// Per-tool invocation deadline in seconds.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Per-tool call caps; tools absent here keep their built-in default.
    #[serde(default)]
    pub tool_budgets: BTreeMap<ToolName, u32>,

    /// Validator acceptance curve for iterations 0..=3.
    #[serde(default = "default_confidence_thresholds")]
    pub confidence_thresholds: [f64; 4],
}

fn default_max_iterations() -> u32 {
    3
}
fn default_token_budget() -> u64 {
    500_000
}
fn default_tool_timeout_secs() -> u64 {
    30
}
fn default_confidence_thresholds() -> [f64; 4] {
    [0.85, 0.75, 0.65, 0.60]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            token_budget: default_token_budget(),
            tool_timeout_secs: default_tool_timeout_secs(),
            tool_budgets: BTreeMap::new(),
            confidence_thresholds: default_confidence_thresholds(),
        }
    }
}

impl EngineConfig {
    /// Confidence a Validator pass must reach for the given iteration.
    pub fn threshold_for(&self, iteration: u32) -> f64 {
        let idx = (iteration as usize).min(self.confidence_thresholds.len() - 1);
        self.confidence_thresholds[idx]
    }

    /// Merge per-request overrides on top of this configuration.
    pub fn with_overrides(&self, overrides: &EngineOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(max_iterations) = overrides.max_iterations {
            merged.max_iterations = max_iterations;
        }
        if let Some(token_budget) = overrides.token_budget {
            merged.token_budget = token_budget;
        }
        if let Some(tool_timeout_secs) = overrides.tool_timeout_secs {
            merged.tool_timeout_secs = tool_timeout_secs;
        }
        if let Some(tool_budgets) = &overrides.tool_budgets {
            for (tool, budget) in tool_budgets {
                merged.tool_budgets.insert(*tool, *budget);
            }
        }
        if let Some(thresholds) = overrides.confidence_thresholds {
            merged.confidence_thresholds = thresholds;
        }
        merged
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, t) in self.confidence_thresholds.iter().enumerate() {
            if !(0.0..=1.0).contains(t) {
                return Err(ConfigError::Invalid(format!(
                    "confidence_thresholds[{i}] = {t} is outside [0, 1]"
                )));
            }
        }
        if self.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid("tool_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

/// LLM backend settings used by the planner and validator agents.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key; usually supplied via `SCOPEHOUND_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (testing, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model for planner and validator calls.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "claude-haiku-4-5".into()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, apply env overrides, validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        config.apply_env_overrides();
        config.engine.validate()?;
        Ok(config)
    }

    /// Defaults plus env overrides, for running without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.engine.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SCOPEHOUND_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("SCOPEHOUND_MODEL") {
            if !model.is_empty() {
                self.provider.model = model;
            }
        }
        if let Ok(raw) = std::env::var("SCOPEHOUND_MAX_ITERATIONS") {
            if let Ok(v) = raw.parse() {
                self.engine.max_iterations = v;
            }
        }
        if let Ok(raw) = std::env::var("SCOPEHOUND_TOKEN_BUDGET") {
            if let Ok(v) = raw.parse() {
                self.engine.token_budget = v;
            }
        }
    }

    /// Generate the default configuration as TOML.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_limits() {
        let config = EngineConfig::default();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.token_budget, 500_000);
        assert_eq!(config.tool_timeout_secs, 30);
        assert_eq!(config.confidence_thresholds, [0.85, 0.75, 0.65, 0.60]);
    }

    #[test]
    fn threshold_curve_clamps_past_three() {
        let config = EngineConfig::default();
        assert!((config.threshold_for(0) - 0.85).abs() < 1e-9);
        assert!((config.threshold_for(2) - 0.65).abs() < 1e-9);
        assert!((config.threshold_for(7) - 0.60).abs() < 1e-9);
    }

    #[test]
    fn overrides_merge_on_top() {
        let base = EngineConfig::default();
        let mut tool_budgets = BTreeMap::new();
        tool_budgets.insert(ToolName::WebSearch, 0);

        let merged = base.with_overrides(&EngineOverrides {
            max_iterations: Some(1),
            token_budget: Some(10_000),
            tool_budgets: Some(tool_budgets),
            tool_timeout_secs: None,
            confidence_thresholds: None,
        });

        assert_eq!(merged.max_iterations, 1);
        assert_eq!(merged.token_budget, 10_000);
        assert_eq!(merged.tool_budgets.get(&ToolName::WebSearch), Some(&0));
        assert_eq!(merged.tool_timeout_secs, 30);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.engine.max_iterations, config.engine.max_iterations);
        assert_eq!(parsed.provider.model, config.provider.model);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\nmax_iterations = 2\ntoken_budget = 200000\n\n[engine.tool_budgets]\nseo_audit = 2\n"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.engine.max_iterations, 2);
        assert_eq!(config.engine.token_budget, 200_000);
        assert_eq!(config.engine.tool_budgets.get(&ToolName::SeoAudit), Some(&2));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn invalid_threshold_rejected() {
        let mut config = EngineConfig::default();
        config.confidence_thresholds[1] = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("max_iterations"));
        assert!(toml_str.contains("claude-haiku-4-5"));
    }
}
