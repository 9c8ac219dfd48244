//! Expansion Readiness - guided interview and readiness synthesis.
//!
//! A conversational delegate walks a founder through five business domains,
//! recording one answer per topic in a coverage ledger. A pure engine then
//! turns the ledger into deterministic readiness verdicts, with an advisory
//! narrative layered on top.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
