//! Session service - the main entry point for live troubleshooting sessions.
//!
//! The assistant ties the pieces together for one technician at a time:
//! - Loading published packs and session histories from the injected stores
//! - Presenting the current step via the resolver
//! - Checking and evaluating submissions before they are recorded
//! - Appending with compare-and-append so a stale tail never decides a step

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    Config, RigflowError, Result,
    common::MemCache,
    measure::{ParsedSpec, convert_unit, evaluate, normalize_unit},
    model::Action,
    pack::{
        RulePack,
        node::{Node, NodeId, NodeKind},
    },
    resolver::next_step_id,
    store::{ActionStore, PackStore},
};

/// A technician's answer to the step currently shown.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// node the technician answered
    pub step_id: NodeId,
    #[serde(default)]
    pub value: Value,
    /// verdict for `inspect` steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// unit the reading was taken in, when it differs from the node's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Submission {
    pub fn new(
        step_id: impl Into<NodeId>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_ok(
        mut self,
        ok: bool,
    ) -> Self {
        self.ok = Some(ok);
        self
    }

    pub fn with_unit(
        mut self,
        unit: impl Into<String>,
    ) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Live session service over injected stores.
///
/// # Example
///
/// ```rust,ignore
/// let store = MemStore::new();
/// store.publish_json(pack_json)?;
/// let assistant = AssistantBuilder::new().pack_store(store.clone()).action_store(store).build()?;
///
/// let step = assistant.current_step("topdrive.rpm.low", "session-1")?;
/// let next = assistant.submit("topdrive.rpm.low", "session-1", Submission::new("check_rpm", 1250.0))?;
/// ```
pub struct Assistant {
    packs: Arc<dyn PackStore>,
    actions: Arc<dyn ActionStore>,
    /// parsed measure specs keyed by `pack@version/node`
    specs: MemCache<String, ParsedSpec>,
    config: Config,
}

impl Assistant {
    pub fn new_with_config(
        config: Config,
        packs: Arc<dyn PackStore>,
        actions: Arc<dyn ActionStore>,
    ) -> Self {
        Self {
            packs,
            actions,
            specs: MemCache::new(config.cache.spec_capacity),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Published pack for `key`.
    pub fn pack(
        &self,
        key: &str,
    ) -> Result<Arc<RulePack>> {
        self.packs.get_pack_by_key(key)?.ok_or(RigflowError::Store(format!("pack '{}' is not published", key)))
    }

    /// Node the technician should see now, or `None` once the session is complete.
    pub fn current_step(
        &self,
        pack_key: &str,
        session_id: &str,
    ) -> Result<Option<Node>> {
        let pack = self.pack(pack_key)?;
        let history = self.history(session_id)?;
        Ok(next_step_id(&pack, &history).and_then(|id| pack.node(&id).cloned()))
    }

    /// Record `submission` and return the id of the step that follows it.
    pub fn submit(
        &self,
        pack_key: &str,
        session_id: &str,
        submission: Submission,
    ) -> Result<Option<NodeId>> {
        let pack = self.pack(pack_key)?;
        let history = self.history(session_id)?;

        let current = next_step_id(&pack, &history).ok_or(RigflowError::Submission(format!("session '{}' is already complete", session_id)))?;
        if current != submission.step_id {
            return Err(RigflowError::Submission(format!(
                "step '{}' is not the current step, expected '{}'",
                submission.step_id, current
            )));
        }

        let node = pack
            .node(&current)
            .ok_or(RigflowError::Structural(format!("pack '{}' has no node '{}'", pack.key, current)))?;
        let action = self.action(&pack, node, submission)?;

        let expected_len = history.len();
        let record = self.actions.append_action(session_id, expected_len, action)?;
        info!(pack = %pack.key, session = session_id, step = %record.action.step_id, ok = ?record.action.ok, "recorded submission");

        let mut history = history;
        history.push(record.action);
        Ok(next_step_id(&pack, &history))
    }

    fn history(
        &self,
        session_id: &str,
    ) -> Result<Vec<Action>> {
        Ok(self.actions.list_actions_for_session(session_id)?.into_iter().map(|r| r.action).collect())
    }

    /// Turn a submission into the history entry for `node`.
    fn action(
        &self,
        pack: &RulePack,
        node: &Node,
        submission: Submission,
    ) -> Result<Action> {
        let kind = node.node_type();
        let Submission { step_id, value, ok, unit } = submission;

        match &node.kind {
            NodeKind::Measure { unit: expected_unit, .. } => {
                let reading = reading(node, &value)?;
                let reading = match unit.as_deref() {
                    Some(raw) => convert_unit(reading, normalize_unit(raw), *expected_unit),
                    None => reading,
                };
                let pass = evaluate(reading, &self.spec(pack, node));
                Ok(Action::new(step_id, kind, reading).with_ok(pass))
            }
            NodeKind::PlcRead { .. } => {
                let reading = reading(node, &value)?;
                let pass = evaluate(reading, &self.spec(pack, node));
                Ok(Action::new(step_id, kind, value).with_ok(pass))
            }
            NodeKind::Inspect { .. } => {
                let ok = ok.ok_or(RigflowError::Submission(format!("inspect step '{}' needs an ok verdict", node.id)))?;
                Ok(Action::new(step_id, kind, value).with_ok(ok))
            }
            NodeKind::Ask { .. } => {
                if !value.is_boolean() {
                    return Err(RigflowError::Submission(format!("ask step '{}' needs a yes/no answer, got {}", node.id, value)));
                }
                Ok(Action::new(step_id, kind, value))
            }
            NodeKind::Photo { required, .. } => {
                let has_url = value.as_str().is_some_and(|url| !url.trim().is_empty());
                if *required && !has_url {
                    return Err(RigflowError::Submission(format!("photo step '{}' needs a photo url", node.id)));
                }
                Ok(Action::new(step_id, kind, value))
            }
            NodeKind::Info { .. } | NodeKind::SafetyGate { .. } => Ok(Action::new(step_id, kind, value)),
            NodeKind::End { .. } => Err(RigflowError::Submission(format!("step '{}' ends the procedure", node.id))),
        }
    }

    fn spec(
        &self,
        pack: &RulePack,
        node: &Node,
    ) -> ParsedSpec {
        let key = format!("{}@{}/{}", pack.key, pack.version, node.id);
        self.specs.get_or_insert_with(key, || node.spec().unwrap_or(ParsedSpec::Empty {}))
    }
}

/// Numeric reading from a submitted value. PLC booleans read as 1/0.
fn reading(
    node: &Node,
    value: &Value,
) -> Result<f64> {
    let reading = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) if matches!(node.kind, NodeKind::PlcRead { .. }) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    reading
        .filter(|r| r.is_finite())
        .ok_or(RigflowError::Submission(format!("step '{}' needs a finite numeric reading, got {}", node.id, value)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{AssistantBuilder, model::NodeType, store::MemStore};

    const TOPDRIVE: &str = "topdrive.rpm.low";
    const MUD_PUMP: &str = "mudpump.discharge.pressure";

    fn setup() -> (Assistant, MemStore) {
        let store = MemStore::new();
        store.publish_json(include_str!("../packs/topdrive_rpm_low.json")).unwrap();
        store.publish_json(include_str!("../packs/mud_pump_pressure.json")).unwrap();
        let assistant = AssistantBuilder::new().pack_store(store.clone()).action_store(store.clone()).build().unwrap();
        (assistant, store)
    }

    fn current(
        assistant: &Assistant,
        pack: &str,
        session: &str,
    ) -> Option<NodeId> {
        assistant.current_step(pack, session).unwrap().map(|n| n.id)
    }

    #[test]
    fn test_walk_topdrive_to_done() {
        let (assistant, store) = setup();
        assert_eq!(current(&assistant, TOPDRIVE, "s1").as_deref(), Some("check_rpm"));

        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("check_rpm", 1250)).unwrap();
        assert_eq!(next.as_deref(), Some("check_hyd_pressure"));

        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("check_hyd_pressure", "175")).unwrap();
        assert_eq!(next.as_deref(), Some("confirm_restart"));

        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("confirm_restart", json!({ "confirmed": false }))).unwrap();
        assert_eq!(next.as_deref(), Some("confirm_restart"));

        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("confirm_restart", json!({ "confirmed": true }))).unwrap();
        assert_eq!(next.as_deref(), Some("done_success"));
        assert_eq!(current(&assistant, TOPDRIVE, "s1").as_deref(), Some("done_success"));

        let history = store.list_actions_for_session("s1").unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].action.ok, Some(true));
        assert_eq!(history[1].action.value, json!(175.0));
    }

    #[test]
    fn test_failed_measurement_branches() {
        let (assistant, _) = setup();
        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("check_rpm", 1100.0)).unwrap();
        assert_eq!(next.as_deref(), Some("low_rpm_fault"));

        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("low_rpm_fault", Value::Null)).unwrap();
        assert_eq!(next.as_deref(), Some("done_failure"));
        assert_eq!(assistant.current_step(TOPDRIVE, "s1").unwrap().map(|n| n.node_type()), Some(NodeType::End));
    }

    #[test]
    fn test_reading_unit_is_converted() {
        let (assistant, _) = setup();
        assistant.submit(TOPDRIVE, "s1", Submission::new("check_rpm", 1250)).unwrap();
        // 12 bar is about 174 psi
        let next = assistant.submit(TOPDRIVE, "s1", Submission::new("check_hyd_pressure", 12.0).with_unit("bar")).unwrap();
        assert_eq!(next.as_deref(), Some("confirm_restart"));
    }

    #[test]
    fn test_reject_wrong_step() {
        let (assistant, store) = setup();
        let err = assistant.submit(TOPDRIVE, "s1", Submission::new("check_hyd_pressure", 175)).unwrap_err();
        assert!(matches!(err, RigflowError::Submission(_)));
        assert!(store.list_actions_for_session("s1").unwrap().is_empty());
    }

    #[test]
    fn test_reject_non_numeric_reading() {
        let (assistant, _) = setup();
        for value in [json!("fast"), json!(null), json!(true)] {
            let err = assistant.submit(TOPDRIVE, "s1", Submission::new("check_rpm", value)).unwrap_err();
            assert!(matches!(err, RigflowError::Submission(_)));
        }
    }

    #[test]
    fn test_reject_after_completion() {
        let (assistant, _) = setup();
        assistant.submit(TOPDRIVE, "s1", Submission::new("check_rpm", 1100)).unwrap();
        assistant.submit(TOPDRIVE, "s1", Submission::new("low_rpm_fault", Value::Null)).unwrap();

        // session sits on the terminal node; submitting against it is refused
        let err = assistant.submit(TOPDRIVE, "s1", Submission::new("done_failure", Value::Null)).unwrap_err();
        assert!(matches!(err, RigflowError::Submission(_)));
    }

    #[test]
    fn test_unknown_pack() {
        let (assistant, _) = setup();
        assert!(matches!(assistant.current_step("nope", "s1"), Err(RigflowError::Store(_))));
    }

    #[test]
    fn test_mud_pump_plc_inspect_and_photo() {
        let (assistant, _) = setup();
        assert_eq!(current(&assistant, MUD_PUMP, "s1").as_deref(), Some("lockout"));
        assistant.submit(MUD_PUMP, "s1", Submission::new("lockout", true)).unwrap();

        let next = assistant.submit(MUD_PUMP, "s1", Submission::new("plc_discharge", 2500)).unwrap();
        assert_eq!(next.as_deref(), Some("inspect_valves"));

        let err = assistant.submit(MUD_PUMP, "s1", Submission::new("inspect_valves", Value::Null)).unwrap_err();
        assert!(matches!(err, RigflowError::Submission(_)));
        let next = assistant.submit(MUD_PUMP, "s1", Submission::new("inspect_valves", Value::Null).with_ok(false)).unwrap();
        assert_eq!(next.as_deref(), Some("photo_valves"));

        let err = assistant.submit(MUD_PUMP, "s1", Submission::new("photo_valves", "")).unwrap_err();
        assert!(matches!(err, RigflowError::Submission(_)));
        let next = assistant.submit(MUD_PUMP, "s1", Submission::new("photo_valves", "https://blob.example/valves.jpg")).unwrap();
        assert_eq!(next.as_deref(), Some("done_replace"));
    }

    #[test]
    fn test_mud_pump_ask_requires_bool() {
        let (assistant, _) = setup();
        assistant.submit(MUD_PUMP, "s1", Submission::new("lockout", json!({ "confirmed": true }))).unwrap();
        let next = assistant.submit(MUD_PUMP, "s1", Submission::new("plc_discharge", 3200)).unwrap();
        assert_eq!(next.as_deref(), Some("pulsation_ok"));

        let err = assistant.submit(MUD_PUMP, "s1", Submission::new("pulsation_ok", "yes")).unwrap_err();
        assert!(matches!(err, RigflowError::Submission(_)));
        let next = assistant.submit(MUD_PUMP, "s1", Submission::new("pulsation_ok", true)).unwrap();
        assert_eq!(next.as_deref(), Some("done_ok"));
    }

    #[test]
    fn test_stale_append_is_a_conflict() {
        let (assistant, store) = setup();
        // another device records the first step behind this one's back
        let history = store.list_actions_for_session("s1").unwrap();
        store.append_action("s1", history.len(), Action::new("check_rpm", NodeType::Measure, 1250).with_ok(true)).unwrap();
        let err = store.append_action("s1", history.len(), Action::new("check_rpm", NodeType::Measure, 1100).with_ok(false)).unwrap_err();
        assert_eq!(err, RigflowError::Conflict { expected: 0, actual: 1 });

        // the assistant reads the fresh tail and moves on
        assert_eq!(current(&assistant, TOPDRIVE, "s1").as_deref(), Some("check_hyd_pressure"));
    }

    #[test]
    fn test_corrected_pack_needs_new_version() {
        let store = MemStore::new();
        let assistant = AssistantBuilder::new().pack_store(store.clone()).action_store(store.clone()).build().unwrap();
        let pack = |version: u32, expect: &str| {
            RulePack::from_value(json!({
                "key": "k",
                "version": version,
                "start": "m",
                "nodes": {
                    "m": { "kind": "measure", "unit": "V", "expect": expect, "passNext": "ok", "failNext": "bad" },
                    "ok": { "kind": "done" },
                    "bad": { "kind": "end" }
                }
            }))
            .unwrap()
        };

        store.publish(pack(1, "20-28")).unwrap();
        assert_eq!(assistant.submit("k", "s1", Submission::new("m", 24)).unwrap().as_deref(), Some("ok"));

        // same version cannot be replaced in place
        assert!(matches!(store.publish(pack(1, "100-110")), Err(RigflowError::Store(_))));
        assert_eq!(assistant.submit("k", "s2", Submission::new("m", 24)).unwrap().as_deref(), Some("ok"));

        store.publish(pack(2, "100-110")).unwrap();
        assert_eq!(assistant.submit("k", "s3", Submission::new("m", 24)).unwrap().as_deref(), Some("bad"));
    }
}
