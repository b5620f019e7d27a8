//! # Scopehound Engine
//!
//! The recursive context-gathering validation loop: a bounded,
//! iteration-driven cycle that decides whether a client change-request
//! carries enough information for a developer to act, and if not, drives
//! the tool fleet to fill the gaps before escalating to a human.
//!
//! Control flow for one request:
//!
//! ```text
//!       Validator (iter = 0)
//!           │
//!       Router ──complete──► architect handoff
//!           │
//!        incomplete
//!           │
//!       Planner → Executor → Validator (iter = n+1) ─┐
//!           ▲                                        │
//!           └── iter < max & under budget & progress ┘
//!           │
//!        exhausted / stalled / over budget
//!           │
//!       escalation record
//! ```

pub mod driver;
pub mod executor;
pub mod handoff;
pub mod progress;
pub mod router;

pub use driver::{EngineOutput, LoopDriver};
pub use executor::{ExecutionReport, Executor};
pub use router::{route, Route};
