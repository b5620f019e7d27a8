//! # Scopehound Providers
//!
//! LLM backend implementations of the core [`Provider`] trait.
//!
//! The planner and validator agents only ever need `complete()`: they ask
//! for strictly structured JSON in plain text and parse it themselves, so
//! no tool-calling or streaming surface is exposed here.
//!
//! [`Provider`]: scopehound_core::Provider

pub mod anthropic;
pub mod scripted;

pub use anthropic::AnthropicProvider;
pub use scripted::ScriptedProvider;
