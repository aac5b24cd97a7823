use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::{
    RigflowError, Result,
    model::RulePackModel,
    pack::{
        graph::PackGraph,
        node::{Node, NodeId},
    },
};

/// Normalized, immutable troubleshooting procedure.
///
/// Construction only normalizes node dialects. Structural soundness
/// (start exists, targets resolve) is the validator's job, so a pack with
/// dangling references can still be loaded, inspected and resolved against.
#[derive(Debug, Clone, Serialize)]
pub struct RulePack {
    pub key: String,
    pub version: u32,
    pub start: NodeId,
    nodes: BTreeMap<NodeId, Node>,
}

impl RulePack {
    pub fn from_json(s: &str) -> Result<Self> {
        Self::try_from(&RulePackModel::from_json(s)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::try_from(&RulePackModel::from_value(value)?)
    }

    /// get node by id
    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn graph(&self) -> PackGraph {
        PackGraph::new(self)
    }
}

impl TryFrom<&RulePackModel> for RulePack {
    type Error = RigflowError;

    fn try_from(model: &RulePackModel) -> Result<Self> {
        trace!("rulepack::try_from({}@{})", model.key, model.version);
        let mut nodes = BTreeMap::new();

        for (id, node) in model.nodes.iter() {
            let node = Node::new(id.clone(), node)?;
            nodes.insert(node.id.clone(), node);
        }

        Ok(Self {
            key: model.key.clone(),
            version: model.version,
            start: model.start.clone(),
            nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::NodeType;

    #[test]
    fn test_sample_packs_load() {
        let topdrive = RulePack::from_json(include_str!("../../packs/topdrive_rpm_low.json")).unwrap();
        assert_eq!(topdrive.key, "topdrive.rpm.low");
        assert_eq!(topdrive.node("check_rpm").map(|n| n.node_type()), Some(NodeType::Measure));
        assert_eq!(topdrive.node("done_success").map(|n| n.node_type()), Some(NodeType::Done));

        let mud_pump = RulePack::from_json(include_str!("../../packs/mud_pump_pressure.json")).unwrap();
        assert_eq!(mud_pump.version, 2);
        assert_eq!(mud_pump.node("lockout").map(|n| n.node_type()), Some(NodeType::SafetyGate));
        assert_eq!(mud_pump.node("plc_discharge").map(|n| n.node_type()), Some(NodeType::PlcRead));
    }

    #[test]
    fn test_missing_start_still_loads() {
        let pack = RulePack::from_value(json!({
            "key": "k",
            "start": "nowhere",
            "nodes": { "a": { "type": "end" } }
        }))
        .unwrap();
        assert!(pack.node(&pack.start).is_none());
        assert_eq!(pack.len(), 1);
    }

    #[test]
    fn test_invalid_node_fails_load() {
        let result = RulePack::from_value(json!({
            "key": "k",
            "start": "a",
            "nodes": { "a": { "kind": "measure", "type": "ask" } }
        }));
        assert!(matches!(result, Err(RigflowError::Node(_))));
    }
}
