//! Structural validation of authored rule packs.
//!
//! A missing start node or a branch naming a node that does not exist is
//! fatal. Everything else is reported as a [`Warning`] and publishing stays
//! the author's decision.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::{
    RigflowError, Result,
    config::ValidatorConfig,
    pack::{
        RulePack,
        node::{Expectation, NodeId, NodeKind},
    },
};

/// Non-fatal finding about a pack.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Warning {
    /// Non-terminal node with no successor; the technician would be stranded.
    DeadEnd {
        node: NodeId,
    },
    /// Both outcomes of a conditional node lead to the same place.
    RedundantBranch {
        node: NodeId,
        target: NodeId,
    },
    /// Nodes that can never be shown.
    Unreachable {
        nodes: Vec<NodeId>,
    },
    /// Measure node whose expectation passes every reading.
    OpenSpec {
        node: NodeId,
        expect: Option<String>,
    },
    /// Reachable nodes from which no terminal or dead end can be reached.
    NoExit {
        nodes: Vec<NodeId>,
    },
}

impl fmt::Display for Warning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Warning::DeadEnd { node } => write!(f, "node '{}' is not terminal but has no next step", node),
            Warning::RedundantBranch { node, target } => write!(f, "node '{}' branches to '{}' on every outcome", node, target),
            Warning::Unreachable { nodes } => write!(f, "unreachable from start: {}", nodes.join(", ")),
            Warning::OpenSpec { node, expect: Some(expect) } => {
                write!(f, "measure node '{}' expectation '{}' has no number, every reading will pass", node, expect)
            }
            Warning::OpenSpec { node, expect: None } => write!(f, "measure node '{}' has no expectation, every reading will pass", node),
            Warning::NoExit { nodes } => write!(f, "no path to an end from: {}", nodes.join(", ")),
        }
    }
}

/// Result of a successful validation.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings rendered as plain messages.
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Validate `pack` with the default validator settings.
pub fn validate_graph(pack: &RulePack) -> Result<ValidationReport> {
    validate_graph_with(pack, &ValidatorConfig::default())
}

pub fn validate_graph_with(
    pack: &RulePack,
    config: &ValidatorConfig,
) -> Result<ValidationReport> {
    if pack.node(&pack.start).is_none() {
        return Err(RigflowError::Structural(format!("start node '{}' does not exist in pack '{}'", pack.start, pack.key)));
    }

    let graph = pack.graph();
    if !graph.dangling().is_empty() {
        let missing: Vec<String> = graph
            .dangling()
            .iter()
            .map(|edge| format!("'{}' {} -> '{}'", edge.source, edge.branch, edge.target))
            .collect();
        return Err(RigflowError::Structural(format!("pack '{}' references missing nodes: {}", pack.key, missing.join(", "))));
    }

    let mut warnings = Vec::new();

    for node in pack.nodes() {
        let edges = node.edges();
        if !node.is_terminal() && edges.is_empty() {
            warnings.push(Warning::DeadEnd { node: node.id.clone() });
        }

        if let [first, second] = edges.as_slice() {
            if first.target == second.target {
                warnings.push(Warning::RedundantBranch {
                    node: node.id.clone(),
                    target: first.target.clone(),
                });
            }
        }

        if config.warn_open_specs {
            if let NodeKind::Measure { unit, expectation, .. } = &node.kind {
                if expectation.spec(*unit).is_empty() {
                    let expect = match expectation {
                        Expectation::Text(text) => Some(text.clone()),
                        _ => None,
                    };
                    warnings.push(Warning::OpenSpec { node: node.id.clone(), expect });
                }
            }
        }
    }

    let reachable = graph.reachable_from(&pack.start);
    let unreachable: Vec<NodeId> = pack.nodes().filter(|n| !reachable.contains(&n.id)).map(|n| n.id.clone()).collect();
    if !unreachable.is_empty() {
        warnings.push(Warning::Unreachable { nodes: unreachable });
    }

    let escapable = graph.can_exit();
    let trapped: Vec<NodeId> = reachable.iter().filter(|id| !escapable.contains(*id)).cloned().collect();
    if !trapped.is_empty() {
        warnings.push(Warning::NoExit { nodes: trapped });
    }

    debug!(pack = %pack.key, nodes = pack.len(), warnings = warnings.len(), "validated rule pack");
    Ok(ValidationReport { warnings })
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn pack(nodes: Value) -> RulePack {
        pack_with_start("a", nodes)
    }

    fn pack_with_start(
        start: &str,
        nodes: Value,
    ) -> RulePack {
        RulePack::from_value(json!({ "key": "validator.test", "version": 1, "start": start, "nodes": nodes })).unwrap()
    }

    #[test]
    fn test_sample_packs_are_clean() {
        let topdrive = RulePack::from_json(include_str!("../packs/topdrive_rpm_low.json")).unwrap();
        assert_eq!(validate_graph(&topdrive).unwrap(), ValidationReport::default());

        let mud_pump = RulePack::from_json(include_str!("../packs/mud_pump_pressure.json")).unwrap();
        assert!(validate_graph(&mud_pump).unwrap().is_clean());
    }

    #[test]
    fn test_missing_start_is_fatal() {
        let p = pack_with_start("ghost", json!({ "a": { "type": "end" } }));
        let result = validate_graph(&p);
        assert!(matches!(result, Err(RigflowError::Structural(_))));
        assert!(result.unwrap_err().to_string().contains("ghost"));
    }

    #[test]
    fn test_unresolved_branch_is_fatal() {
        let p = pack(json!({
            "a": { "type": "measure", "expect": "1-2", "passNext": "b", "failNext": "missing" },
            "b": { "type": "done" }
        }));
        let err = validate_graph(&p).unwrap_err();
        assert!(matches!(err, RigflowError::Structural(_)));
        assert!(err.to_string().contains("'a' fail -> 'missing'"));
    }

    #[test]
    fn test_unreachable_nodes_listed_together() {
        let p = pack(json!({
            "a": { "type": "info", "next": "z" },
            "orphan1": { "type": "info", "next": "z" },
            "orphan2": { "type": "ask", "yes": "orphan1", "no": "z" },
            "z": { "type": "done" }
        }));
        let report = validate_graph(&p).unwrap();
        assert_eq!(
            report.warnings,
            vec![Warning::Unreachable {
                nodes: vec!["orphan1".to_string(), "orphan2".to_string()]
            }]
        );
        assert_eq!(report.messages(), vec!["unreachable from start: orphan1, orphan2".to_string()]);
    }

    #[test]
    fn test_dead_end_warning() {
        let p = pack(json!({
            "a": { "type": "inspect", "passNext": "b", "failNext": "c" },
            "b": { "type": "photo" },
            "c": { "type": "end" }
        }));
        let report = validate_graph(&p).unwrap();
        assert_eq!(report.warnings, vec![Warning::DeadEnd { node: "b".to_string() }]);
    }

    #[test]
    fn test_redundant_branch_warning() {
        let p = pack(json!({
            "a": { "type": "measure", "expect": ">=24", "passNext": "b", "failNext": "b" },
            "b": { "type": "ask", "yes": "c", "no": "c" },
            "c": { "type": "done" }
        }));
        let report = validate_graph(&p).unwrap();
        assert_eq!(
            report.warnings,
            vec![
                Warning::RedundantBranch {
                    node: "a".to_string(),
                    target: "b".to_string()
                },
                Warning::RedundantBranch {
                    node: "b".to_string(),
                    target: "c".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_open_spec_warning() {
        let p = pack(json!({
            "a": { "type": "measure", "expect": "looks fine", "passNext": "b", "failNext": "c" },
            "b": { "type": "measure", "unit": "V", "passNext": "c", "failNext": "d" },
            "c": { "type": "done" },
            "d": { "type": "end" }
        }));
        let report = validate_graph(&p).unwrap();
        assert_eq!(
            report.warnings,
            vec![
                Warning::OpenSpec {
                    node: "a".to_string(),
                    expect: Some("looks fine".to_string())
                },
                Warning::OpenSpec {
                    node: "b".to_string(),
                    expect: None
                },
            ]
        );

        let quiet = validate_graph_with(&p, &ValidatorConfig { warn_open_specs: false }).unwrap();
        assert!(quiet.is_clean());
    }

    #[test]
    fn test_safety_gate_self_loop_is_legal() {
        let p = pack(json!({
            "a": { "type": "safetyGate", "next": "b" },
            "b": { "type": "inspect", "passNext": "c", "failNext": "a" },
            "c": { "type": "done" }
        }));
        assert!(validate_graph(&p).unwrap().is_clean());
    }

    #[test]
    fn test_cycle_without_exit_is_flagged() {
        let p = pack(json!({
            "a": { "type": "ask", "yes": "loop1", "no": "z" },
            "loop1": { "type": "info", "next": "loop2" },
            "loop2": { "type": "inspect", "passNext": "loop1", "failNext": "loop1" },
            "z": { "type": "done" }
        }));
        let report = validate_graph(&p).unwrap();
        assert!(report.warnings.contains(&Warning::NoExit {
            nodes: vec!["loop1".to_string(), "loop2".to_string()]
        }));
    }
}
