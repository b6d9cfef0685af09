//! Benefit eligibility engine.
//!
//! Loads per-jurisdiction rule documents, evaluates every configured program against a household's
//! facts, ranks the results, and enriches them with program content, cross-program interactions,
//! and an ordered action plan.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod telemetry;
