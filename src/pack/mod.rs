//! Normalized rule packs.
//!
//! Authored packs ([`crate::RulePackModel`]) come in two node dialects. They
//! are normalized here, once, into a single closed set of node kinds that the
//! resolver, validator and simulator pattern-match on.

pub mod edge;
pub mod graph;
pub mod node;
mod rulepack;

pub use rulepack::RulePack;
