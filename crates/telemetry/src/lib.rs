//! # Scopehound Telemetry
//!
//! Execution tracing for the enrichment engine: one span per validator
//! pass, per enrichment iteration, and per tool invocation, collected
//! into a per-request trace, plus the fixed per-request metric set.

pub mod metrics;
pub mod model;

pub use metrics::RequestMetrics;
pub use model::{RequestTrace, Span, SpanKind};
