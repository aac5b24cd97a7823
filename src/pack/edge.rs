//! Outgoing edges of a node.
//!
//! Nodes name their successors inline (`next`, `yes`, `passNext`, ...). A
//! [`Branch`] says which outcome an edge belongs to.

use serde::{Deserialize, Serialize};

use crate::pack::node::NodeId;

/// Outcome an edge is taken on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Branch {
    /// Unconditional flow.
    #[default]
    Next,
    /// `ask` answered yes.
    Yes,
    /// `ask` answered no.
    No,
    /// Reading or inspection passed.
    Pass,
    /// Reading or inspection failed.
    Fail,
}

/// Authored edge from one node to a named target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node, which may not exist in the pack.
    pub target: NodeId,
    /// Which outcome this edge is taken on.
    pub branch: Branch,
}
