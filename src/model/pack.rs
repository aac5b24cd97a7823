use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{RigflowError, Result, model::NodeModel};

fn default_version() -> u32 {
    1
}

/// Rule pack as authored and stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulePackModel {
    pub key: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub start: String,
    pub nodes: HashMap<String, NodeModel>,
}

impl RulePackModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let value = serde_json::from_str::<Value>(s)?;
        Self::from_value(value)
    }

    /// Check the document against [`RulePackModel::schema`], then deserialize it.
    pub fn from_value(value: Value) -> Result<Self> {
        jsonschema::validate(&Self::schema(), &value)?;
        let pack = serde_json::from_value::<RulePackModel>(value);
        match pack {
            Ok(v) => Ok(v),
            Err(e) => Err(RigflowError::Convert(format!("invalid rule pack: {}", e))),
        }
    }

    /// JSON Schema of the pack document.
    pub fn schema() -> Value {
        let kind_is = |kinds: &[&str]| {
            json!({
                "anyOf": [
                    { "required": ["type"], "properties": { "type": { "enum": kinds } } },
                    { "required": ["kind"], "properties": { "kind": { "enum": kinds } } }
                ]
            })
        };
        let target = json!({ "type": ["string", "null"] });

        json!({
            "type": "object",
            "required": ["key", "start", "nodes"],
            "properties": {
                "key": { "type": "string", "minLength": 1 },
                "version": { "type": "integer", "minimum": 1 },
                "start": { "type": "string" },
                "nodes": {
                    "type": "object",
                    "minProperties": 1,
                    "additionalProperties": { "$ref": "#/$defs/node" }
                }
            },
            "$defs": {
                "node": {
                    "type": "object",
                    "anyOf": [
                        { "required": ["type"] },
                        { "required": ["kind"] }
                    ],
                    "properties": {
                        "type": { "type": "string" },
                        "kind": { "type": "string" },
                        "citations": { "type": "array" },
                        "next": target,
                        "yes": target,
                        "no": target,
                        "passNext": target,
                        "failNext": target,
                        "nextOn": { "type": "object" },
                        "min": { "type": "number" },
                        "max": { "type": "number" },
                        "tolerance": { "type": ["number", "string"] },
                        "checklist": { "type": "array", "items": { "type": "string" } },
                        "points": { "type": "array", "items": { "type": "string" } }
                    },
                    "allOf": [
                        {
                            "if": kind_is(&["plc_read", "plcRead"]),
                            "then": {
                                "required": ["tag", "expect"],
                                "properties": {
                                    "tag": { "type": "string", "minLength": 1 },
                                    "expect": {
                                        "type": "object",
                                        "required": ["op", "value"],
                                        "properties": { "op": { "type": "string" } }
                                    }
                                }
                            }
                        },
                        {
                            "if": kind_is(&["measure"]),
                            "then": {
                                "properties": { "expect": { "type": ["string", "number"] } }
                            }
                        }
                    ]
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_pack_model_from_json() {
        let model = RulePackModel::from_json(include_str!("../../packs/topdrive_rpm_low.json")).unwrap();
        assert_eq!(model.key, "topdrive.rpm.low");
        assert_eq!(model.version, 1);
        assert_eq!(model.start, "check_rpm");
        assert!(model.nodes.contains_key("done_success"));
    }

    #[test]
    fn test_pack_model_version_defaults() {
        let model = RulePackModel::from_value(json!({
            "key": "k",
            "start": "a",
            "nodes": { "a": { "type": "done" } }
        }))
        .unwrap();
        assert_eq!(model.version, 1);
    }

    #[test]
    fn test_pack_model_requires_discriminator() {
        let result = RulePackModel::from_value(json!({
            "key": "k",
            "start": "a",
            "nodes": { "a": { "instruction": "no kind here" } }
        }));
        assert!(matches!(result, Err(RigflowError::Convert(_))));
    }

    #[test]
    fn test_pack_model_plc_read_requires_tag() {
        let result = RulePackModel::from_value(json!({
            "key": "k",
            "start": "a",
            "nodes": { "a": { "kind": "plc_read", "expect": { "op": ">=", "value": 1 } } }
        }));
        assert!(result.is_err());

        let result = RulePackModel::from_value(json!({
            "key": "k",
            "start": "a",
            "nodes": { "a": { "kind": "plc_read", "tag": "TD_RPM", "expect": ">=1" } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_pack_model_missing_start() {
        let result = RulePackModel::from_value(json!({ "key": "k", "nodes": { "a": { "type": "end" } } }));
        assert!(result.is_err());
    }
}
