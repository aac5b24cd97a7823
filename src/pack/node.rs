use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Result, RigflowError,
    measure::{Comparison, ParsedSpec, Unit, format_number, format_spec, normalize_unit, parse_spec},
    model::{Citation, NextOnModel, NodeModel, NodeType},
    pack::edge::{Branch, Edge},
};

/// node id
pub type NodeId = String;

/// Expected reading of a measure node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Free-text expectation, parsed on demand.
    Text(String),
    /// Already structured (`min`/`max`, `expect` + `tolerance`, numeric `expect`).
    Structured(ParsedSpec),
    /// Nothing authored; every reading passes.
    Missing,
}

impl Expectation {
    pub fn spec(
        &self,
        unit: Unit,
    ) -> ParsedSpec {
        match self {
            Expectation::Text(text) => parse_spec(text, unit),
            Expectation::Structured(spec) => *spec,
            Expectation::Missing => ParsedSpec::Empty {},
        }
    }
}

/// Kind-specific content of a node. Both dialects normalize into this.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeKind {
    Info {
        next: Option<NodeId>,
    },
    Ask {
        yes: Option<NodeId>,
        no: Option<NodeId>,
    },
    Measure {
        unit: Unit,
        expectation: Expectation,
        points: Vec<String>,
        pass_next: Option<NodeId>,
        fail_next: Option<NodeId>,
    },
    PlcRead {
        tag: String,
        spec: ParsedSpec,
        source: Option<Value>,
        pass_next: Option<NodeId>,
        fail_next: Option<NodeId>,
    },
    Photo {
        required: bool,
        storage: Option<String>,
        next: Option<NodeId>,
    },
    SafetyGate {
        hazard: Option<String>,
        checklist: Vec<String>,
        next: Option<NodeId>,
    },
    Inspect {
        pass_next: Option<NodeId>,
        fail_next: Option<NodeId>,
    },
    End {
        done: bool,
    },
}

/// Normalized procedure step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// node id
    pub id: NodeId,
    /// node title, defaults to the id
    pub title: String,
    /// instruction, markdown or prompt text
    pub text: Option<String>,
    /// supporting references, passed through untouched
    pub citations: Vec<Citation>,
    /// kind-specific content
    pub kind: NodeKind,
}

impl Node {
    /// Normalize an authored node of either dialect.
    pub fn new(
        id: impl Into<NodeId>,
        model: &NodeModel,
    ) -> Result<Self> {
        let id = id.into();
        let node_type = Self::discriminator(&id, model)?;
        let next_on = model.next_on.clone().unwrap_or_default();
        let NextOnModel { pass, fail, yes, no, next } = next_on;

        let next = model.next.clone().or(next);
        let pass_next = model.pass_next.clone().or(pass);
        let fail_next = model.fail_next.clone().or(fail);

        let kind = match node_type {
            NodeType::Info => NodeKind::Info { next },
            NodeType::Ask => NodeKind::Ask {
                yes: model.yes.clone().or(yes),
                no: model.no.clone().or(no),
            },
            NodeType::Measure => {
                let unit = model.unit.as_deref().map(normalize_unit).unwrap_or_default();
                NodeKind::Measure {
                    unit,
                    expectation: Self::expectation(&id, model)?,
                    points: model.points.clone(),
                    pass_next,
                    fail_next,
                }
            }
            NodeType::PlcRead => {
                let tag = model.tag.clone().ok_or(RigflowError::Node(format!("plc_read node '{}' has no tag", id)))?;
                NodeKind::PlcRead {
                    tag,
                    spec: Self::plc_spec(&id, model)?,
                    source: model.source.clone(),
                    pass_next,
                    fail_next,
                }
            }
            NodeType::Photo => NodeKind::Photo {
                required: model.required.unwrap_or(true),
                storage: model.storage.clone(),
                next,
            },
            NodeType::SafetyGate => NodeKind::SafetyGate {
                hazard: model.hazard.clone(),
                checklist: model.checklist.clone(),
                next,
            },
            NodeType::Inspect => NodeKind::Inspect { pass_next, fail_next },
            NodeType::End => NodeKind::End { done: false },
            NodeType::Done => NodeKind::End { done: true },
        };

        Ok(Self {
            title: model.title.clone().unwrap_or_else(|| id.clone()),
            text: model.instruction.clone().or_else(|| model.markdown.clone()).or_else(|| model.prompt.clone()),
            citations: model.citations.clone(),
            id,
            kind,
        })
    }

    /// `kind` wins when both discriminators are present, but they must agree.
    fn discriminator(
        id: &str,
        model: &NodeModel,
    ) -> Result<NodeType> {
        let parse = |label: &str| {
            label
                .parse::<NodeType>()
                .map_err(|_| RigflowError::Node(format!("node '{}' has unknown kind '{}'", id, label)))
        };

        match (model.kind.as_deref(), model.node_type.as_deref()) {
            (Some(kind), Some(legacy)) => {
                let (kind, legacy) = (parse(kind)?, parse(legacy)?);
                if kind != legacy {
                    return Err(RigflowError::Node(format!("node '{}' declares kind '{}' but type '{}'", id, kind, legacy)));
                }
                Ok(kind)
            }
            (Some(kind), None) => parse(kind),
            (None, Some(legacy)) => parse(legacy),
            (None, None) => Err(RigflowError::Node(format!("node '{}' has neither 'kind' nor 'type'", id))),
        }
    }

    fn expectation(
        id: &str,
        model: &NodeModel,
    ) -> Result<Expectation> {
        if let Some(tolerance) = &model.tolerance {
            let center = model.expect.as_ref().and_then(as_number).ok_or(RigflowError::Node(format!(
                "measure node '{}' has a tolerance but no numeric expect",
                id
            )))?;
            return match tolerance {
                Value::Number(n) => Ok(Expectation::Structured(ParsedSpec::tolerance(center, n.as_f64().unwrap_or_default()))),
                Value::String(s) => match s.trim().strip_suffix('%').and_then(|p| p.trim().parse::<f64>().ok()) {
                    Some(percent) => Ok(Expectation::Structured(ParsedSpec::percent(center, percent))),
                    None => s
                        .trim()
                        .parse::<f64>()
                        .map(|t| Expectation::Structured(ParsedSpec::tolerance(center, t)))
                        .map_err(|_| RigflowError::Node(format!("measure node '{}' has invalid tolerance '{}'", id, s))),
                },
                other => Err(RigflowError::Node(format!("measure node '{}' has invalid tolerance {}", id, other))),
            };
        }

        match (model.min, model.max) {
            (Some(min), Some(max)) => return Ok(Expectation::Structured(ParsedSpec::range(min, max))),
            (Some(min), None) => return Ok(Expectation::Structured(ParsedSpec::Compare { cmp: Comparison::Ge, exact: min })),
            (None, Some(max)) => return Ok(Expectation::Structured(ParsedSpec::Compare { cmp: Comparison::Le, exact: max })),
            (None, None) => {}
        }

        match &model.expect {
            Some(Value::String(text)) => Ok(Expectation::Text(text.clone())),
            Some(Value::Number(n)) => Ok(n.as_f64().map(|exact| Expectation::Structured(ParsedSpec::Exact { exact })).unwrap_or(Expectation::Missing)),
            Some(Value::Null) | None => Ok(Expectation::Missing),
            Some(other) => Err(RigflowError::Node(format!("measure node '{}' has invalid expect {}", id, other))),
        }
    }

    fn plc_spec(
        id: &str,
        model: &NodeModel,
    ) -> Result<ParsedSpec> {
        #[derive(Deserialize)]
        struct PlcExpect {
            op: Comparison,
            value: Value,
        }

        let expect = model.expect.clone().ok_or(RigflowError::Node(format!("plc_read node '{}' has no expect", id)))?;
        let expect = serde_json::from_value::<PlcExpect>(expect).map_err(|e| RigflowError::Node(format!("plc_read node '{}' has invalid expect: {}", id, e)))?;
        let exact = match &expect.value {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            other => as_number(other),
        }
        .ok_or(RigflowError::Node(format!("plc_read node '{}' expects a non-numeric value {}", id, expect.value)))?;

        Ok(ParsedSpec::Compare { cmp: expect.op, exact })
    }

    /// Wire label of this node's kind.
    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Info { .. } => NodeType::Info,
            NodeKind::Ask { .. } => NodeType::Ask,
            NodeKind::Measure { .. } => NodeType::Measure,
            NodeKind::PlcRead { .. } => NodeType::PlcRead,
            NodeKind::Photo { .. } => NodeType::Photo,
            NodeKind::SafetyGate { .. } => NodeType::SafetyGate,
            NodeKind::Inspect { .. } => NodeType::Inspect,
            NodeKind::End { done: false } => NodeType::End,
            NodeKind::End { done: true } => NodeType::Done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::End { .. })
    }

    /// All authored outgoing edges, whether or not their targets exist.
    pub fn edges(&self) -> Vec<Edge> {
        let targets: [(Branch, &Option<NodeId>); 2] = match &self.kind {
            NodeKind::Info { next } | NodeKind::Photo { next, .. } | NodeKind::SafetyGate { next, .. } => [(Branch::Next, next), (Branch::Next, &None)],
            NodeKind::Ask { yes, no } => [(Branch::Yes, yes), (Branch::No, no)],
            NodeKind::Measure { pass_next, fail_next, .. } | NodeKind::PlcRead { pass_next, fail_next, .. } | NodeKind::Inspect { pass_next, fail_next } => {
                [(Branch::Pass, pass_next), (Branch::Fail, fail_next)]
            }
            NodeKind::End { .. } => [(Branch::Next, &None), (Branch::Next, &None)],
        };

        targets
            .into_iter()
            .filter_map(|(branch, target)| {
                target.as_ref().map(|target| Edge {
                    source: self.id.clone(),
                    target: target.clone(),
                    branch,
                })
            })
            .collect()
    }

    /// Pass/fail criterion of measure and plc_read nodes.
    pub fn spec(&self) -> Option<ParsedSpec> {
        match &self.kind {
            NodeKind::Measure { unit, expectation, .. } => Some(expectation.spec(*unit)),
            NodeKind::PlcRead { spec, .. } => Some(*spec),
            _ => None,
        }
    }

    /// Human-readable expectation, if the node declares one.
    pub fn expected_display(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Measure { unit, expectation, .. } => Some(format_spec(&expectation.spec(*unit), *unit)),
            NodeKind::PlcRead { tag, spec, .. } => match spec {
                ParsedSpec::Compare { cmp, exact } => Some(format!("{} {} {}", tag, cmp, format_number(*exact))),
                other => Some(format!("{} {:?}", tag, other)),
            },
            _ => None,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
