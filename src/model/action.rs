use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::NodeType;

/// One technician submission against one node.
///
/// `ok` is computed by the submission handler for measurement-like kinds
/// before the entry is recorded; the engine never re-evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub step_id: String,
    pub kind: NodeType,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
}

impl Action {
    pub fn new(
        step_id: impl Into<String>,
        kind: NodeType,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            kind,
            value: value.into(),
            ok: None,
        }
    }

    pub fn with_ok(
        mut self,
        ok: bool,
    ) -> Self {
        self.ok = Some(ok);
        self
    }

    /// `true` or `{confirmed: true}`
    pub fn is_confirmed(&self) -> bool {
        match &self.value {
            Value::Bool(b) => *b,
            Value::Object(obj) => obj.get("confirmed").and_then(Value::as_bool).unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_action_wire_shape() {
        let action: Action = serde_json::from_value(json!({
            "stepId": "check_rpm",
            "kind": "measure",
            "value": 1250,
            "ok": true
        }))
        .unwrap();
        assert_eq!(action.step_id, "check_rpm");
        assert_eq!(action.kind, NodeType::Measure);
        assert_eq!(action.value, json!(1250));
        assert_eq!(action.ok, Some(true));

        let value = serde_json::to_value(Action::new("gate1", NodeType::SafetyGate, json!({"confirmed": false}))).unwrap();
        assert_eq!(value, json!({"stepId": "gate1", "kind": "safetyGate", "value": {"confirmed": false}}));
    }

    #[test]
    fn test_action_confirmation() {
        assert!(Action::new("g", NodeType::SafetyGate, true).is_confirmed());
        assert!(Action::new("g", NodeType::SafetyGate, json!({"confirmed": true})).is_confirmed());
        assert!(!Action::new("g", NodeType::SafetyGate, json!({"confirmed": false})).is_confirmed());
        assert!(!Action::new("g", NodeType::SafetyGate, json!({"confirmed": "yes"})).is_confirmed());
        assert!(!Action::new("g", NodeType::SafetyGate, Value::Null).is_confirmed());
    }
}
