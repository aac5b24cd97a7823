//! Offline replay of scripted readings through a rule pack.
//!
//! Branching reuses [`resolve_from`], so a simulated walk follows the same
//! rules as a live session. In [`SimulationMode::TrustCaller`] the caller's
//! `pass` flag decides every outcome and specs are never evaluated: the
//! simulation exercises graph shape, not spec correctness. Use
//! [`SimulationMode::Evaluate`] to recompute measure and plc_read outcomes
//! the way live submissions do.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use crate::{
    Config, RigflowError, Result,
    config::DEFAULT_MAX_STEPS,
    measure::evaluate,
    model::{Action, NodeType},
    pack::{
        RulePack,
        node::{Node, NodeId, NodeKind},
    },
    resolver::resolve_from,
};

/// One scripted reading.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SimInput {
    pub value: f64,
    pub pass: bool,
}

impl From<(f64, bool)> for SimInput {
    fn from((value, pass): (f64, bool)) -> Self {
        Self { value, pass }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimulationMode {
    /// Outcomes come from the scripted `pass` flags.
    #[default]
    TrustCaller,
    /// Measure and plc_read outcomes are recomputed from the scripted value.
    Evaluate,
}

#[derive(Debug, Clone, Copy)]
pub struct SimulateOptions {
    pub mode: SimulationMode,
    /// hard cap on visited steps
    pub max_steps: usize,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            mode: SimulationMode::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl From<&Config> for SimulateOptions {
    fn from(config: &Config) -> Self {
        Self {
            mode: SimulationMode::default(),
            max_steps: config.simulator.max_steps,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepResult {
    Pass,
    Fail,
    /// informational step, no verdict
    Note,
    /// terminal node reached
    Done,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimStep {
    pub node_key: NodeId,
    pub kind: NodeType,
    pub instruction: Option<String>,
    /// scripted reading consumed at this step, `None` on the terminal step
    pub input: Option<f64>,
    pub expected: Option<String>,
    pub result: StepResult,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationTrace {
    pub final_node_key: NodeId,
    pub steps: Vec<SimStep>,
}

impl SimulationTrace {
    /// Number of scripted readings the walk consumed.
    pub fn consumed(&self) -> usize {
        self.steps.iter().filter(|s| s.input.is_some()).count()
    }
}

/// Replay `path` through `pack`, trusting the scripted pass flags.
pub fn simulate_rule_pack(
    pack: &RulePack,
    path: &[SimInput],
) -> Result<SimulationTrace> {
    simulate_rule_pack_with(pack, path, &SimulateOptions::default())
}

pub fn simulate_rule_pack_with(
    pack: &RulePack,
    path: &[SimInput],
    options: &SimulateOptions,
) -> Result<SimulationTrace> {
    let mut steps = Vec::new();
    let mut inputs = path.iter();
    let mut current = pack.start.clone();
    let mut visited = 0;

    loop {
        if visited >= options.max_steps {
            return Err(RigflowError::StepBudgetExceeded { limit: options.max_steps });
        }
        visited += 1;

        let node = pack
            .node(&current)
            .ok_or(RigflowError::Structural(format!("pack '{}' has no node '{}'", pack.key, current)))?;

        if node.is_terminal() {
            steps.push(step(node, None, StepResult::Done));
            return finish(node, inputs.as_slice(), steps);
        }

        let Some(input) = inputs.next() else {
            return Err(RigflowError::SimulationLength(format!(
                "insufficient path for this procedure: no reading left for node '{}'",
                node.id
            )));
        };

        let pass = decide(node, input, options.mode);
        let action = synthetic_action(node, input.value, pass);
        let next = resolve_from(node, &action);
        trace!(pack = %pack.key, node = %node.id, value = input.value, pass, next = ?next, "simulated step");

        steps.push(step(node, Some(input.value), result(node, pass)));

        match next {
            Some(next) => current = next,
            // non-terminal node without a successor ends the walk where it is
            None => return finish(node, inputs.as_slice(), steps),
        }
    }
}

fn finish(
    node: &Node,
    remaining: &[SimInput],
    steps: Vec<SimStep>,
) -> Result<SimulationTrace> {
    if !remaining.is_empty() {
        return Err(RigflowError::SimulationLength(format!(
            "path longer than procedure required: reached '{}' with {} unused reading(s)",
            node.id,
            remaining.len()
        )));
    }

    Ok(SimulationTrace {
        final_node_key: node.id.clone(),
        steps,
    })
}

fn decide(
    node: &Node,
    input: &SimInput,
    mode: SimulationMode,
) -> bool {
    match (mode, &node.kind) {
        (SimulationMode::Evaluate, NodeKind::Measure { .. } | NodeKind::PlcRead { .. }) => node.spec().map(|spec| evaluate(input.value, &spec)).unwrap_or(input.pass),
        _ => input.pass,
    }
}

/// History entry a technician would have produced for this outcome.
fn synthetic_action(
    node: &Node,
    value: f64,
    pass: bool,
) -> Action {
    let kind = node.node_type();
    match kind {
        NodeType::Ask => Action::new(node.id.clone(), kind, pass),
        NodeType::SafetyGate => Action::new(node.id.clone(), kind, json!({ "confirmed": pass })),
        NodeType::Measure | NodeType::PlcRead | NodeType::Inspect => Action::new(node.id.clone(), kind, value).with_ok(pass),
        _ => Action::new(node.id.clone(), kind, value),
    }
}

fn result(
    node: &Node,
    pass: bool,
) -> StepResult {
    match node.kind {
        NodeKind::Info { .. } | NodeKind::Photo { .. } => StepResult::Note,
        NodeKind::End { .. } => StepResult::Done,
        _ if pass => StepResult::Pass,
        _ => StepResult::Fail,
    }
}

fn step(
    node: &Node,
    input: Option<f64>,
    result: StepResult,
) -> SimStep {
    SimStep {
        node_key: node.id.clone(),
        kind: node.node_type(),
        instruction: node.text.clone(),
        input,
        expected: node.expected_display(),
        result,
    }
}
