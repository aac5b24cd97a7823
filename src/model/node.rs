use serde::{Deserialize, Serialize};

/// Node kind label as written in packs and history entries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum NodeType {
    #[serde(rename = "info")]
    #[strum(serialize = "info")]
    Info,
    #[serde(rename = "ask")]
    #[strum(serialize = "ask")]
    Ask,
    #[serde(rename = "measure")]
    #[strum(serialize = "measure")]
    Measure,
    #[serde(rename = "plc_read", alias = "plcRead")]
    #[strum(to_string = "plc_read", serialize = "plcRead")]
    PlcRead,
    #[serde(rename = "photo")]
    #[strum(serialize = "photo")]
    Photo,
    #[serde(rename = "safetyGate", alias = "safety_gate")]
    #[strum(to_string = "safetyGate", serialize = "safety_gate")]
    SafetyGate,
    #[serde(rename = "inspect")]
    #[strum(serialize = "inspect")]
    Inspect,
    #[serde(rename = "end")]
    #[strum(serialize = "end")]
    End,
    #[serde(rename = "done")]
    #[strum(serialize = "done")]
    Done,
}

impl NodeType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeType::End | NodeType::Done)
    }
}

/// Branch targets grouped under `nextOn`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextOnModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Reference to supporting material. Never interpreted, only passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Citation {
    Document {
        doc: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<u32>,
    },
    Tag {
        tag: String,
    },
    TestPoint {
        #[serde(rename = "testPoint")]
        test_point: String,
    },
    Other(serde_json::Value),
}

/// Authored node in either dialect.
///
/// Legacy nodes carry `type`, newer steps carry `kind`; everything else is
/// shared and optional. Normalization into [`crate::Node`] decides which
/// fields matter for the kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeModel {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_on: Option<NextOnModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// free text, a number, or `{op, value}` on plc_read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<serde_json::Value>,
    /// absolute number or `"<p>%"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<String>,
}
