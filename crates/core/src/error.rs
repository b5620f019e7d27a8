//! Error types for the Scopehound domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::tool::ToolName;

/// The top-level error type for all Scopehound operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Planner errors ---
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    // --- Validator errors ---
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures raised by the Tool Registry or by tool bodies.
///
/// Tool failures are local and never fatal: the Executor records them in
/// the iteration history and moves on to the next action.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("No implementation registered for tool: {0}")]
    NotRegistered(ToolName),

    #[error("Per-request budget exhausted for tool: {0}")]
    BudgetExhausted(ToolName),

    #[error("Tool timed out: {tool} after {timeout_secs}s")]
    Timeout { tool: ToolName, timeout_secs: u64 },

    #[error("HTTP failure in {tool}: {message}")]
    Http { tool: ToolName, message: String },

    #[error("Parse failure in {tool}: {message}")]
    Parse { tool: ToolName, message: String },

    #[error("Invalid input for {tool}: {message}")]
    InvalidInput { tool: ToolName, message: String },
}

impl ToolError {
    /// Stable error-kind label carried in iteration records and metrics.
    /// The set is closed: timeout, http, parse, budget, invalid_input.
    /// A tool name with no registered implementation is a deployment
    /// misconfiguration and reports as invalid input rather than growing
    /// the taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotRegistered(_) | Self::InvalidInput { .. } => "invalid_input",
            Self::BudgetExhausted(_) => "budget",
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http",
            Self::Parse { .. } => "parse",
        }
    }
}

/// Failures raised while producing an enrichment plan.
///
/// Planner failures are iteration-local: the Loop Driver treats them as an
/// empty plan, which surfaces as lack of progress if repeated.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Planner produced unparseable output: {0}")]
    InvalidOutput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Failures raised while validating a request.
///
/// Validator failures are fatal after one retry — the Validator is the
/// engine's only arbiter of completeness.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Validator produced unparseable output: {0}")]
    InvalidOutput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Failures raised by LLM backends.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}
