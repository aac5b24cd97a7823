//! Next-step resolution.
//!
//! Only the last history entry matters: each entry already records the
//! decision taken at its node (answer, pass/fail verdict, confirmation), so
//! resolution is a constant-time lookup that never fails.

use tracing::{debug, warn};

use crate::{
    model::Action,
    pack::{
        RulePack,
        node::{Node, NodeId, NodeKind},
    },
};

/// Id of the node to present next, or `None` once the procedure is complete.
///
/// An empty history starts at `pack.start`. A last entry naming a node the
/// pack no longer has (edited pack, foreign history) also restarts there.
pub fn next_step_id(
    pack: &RulePack,
    actions: &[Action],
) -> Option<NodeId> {
    let Some(last) = actions.last() else {
        return Some(pack.start.clone());
    };

    let Some(node) = pack.node(&last.step_id) else {
        warn!(pack = %pack.key, step = %last.step_id, "history references a node missing from the pack, restarting");
        return Some(pack.start.clone());
    };

    let next = resolve_from(node, last);
    debug!(pack = %pack.key, from = %node.id, next = ?next, "resolved next step");
    next
}

/// Successor of `node` given the action recorded against it.
pub fn resolve_from(
    node: &Node,
    action: &Action,
) -> Option<NodeId> {
    match &node.kind {
        NodeKind::Ask { yes, no } => {
            let chosen = match action.value.as_bool() {
                Some(true) => yes.as_ref(),
                Some(false) => no.as_ref(),
                None => None,
            };
            // a missing branch falls back to `no`, then `yes`
            chosen.or(no.as_ref()).or(yes.as_ref()).cloned()
        }
        NodeKind::Measure { pass_next, fail_next, .. } | NodeKind::Inspect { pass_next, fail_next } | NodeKind::PlcRead { pass_next, fail_next, .. } => {
            match action.ok {
                Some(true) => pass_next.clone(),
                Some(false) => fail_next.clone(),
                None => pass_next.clone().or_else(|| fail_next.clone()),
            }
        }
        NodeKind::Info { next } | NodeKind::Photo { next, .. } => next.clone(),
        NodeKind::SafetyGate { next, .. } => {
            if action.is_confirmed() {
                next.clone()
            } else {
                Some(node.id.clone())
            }
        }
        NodeKind::End { .. } => None,
    }
}
