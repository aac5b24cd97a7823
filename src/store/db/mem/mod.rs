use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    RigflowError, Result, ShareLock,
    model::Action,
    pack::RulePack,
    store::{ActionStore, PackStore, StoreIden, data::ActionRecord, map_db_err},
};

/// In-memory pack and session storage.
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    packs: ShareLock<HashMap<String, Arc<RulePack>>>,
    actions: ShareLock<HashMap<String, Vec<ActionRecord>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            packs: Arc::new(RwLock::new(HashMap::new())),
            actions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publish `pack` under its key. Published versions are immutable: only a
    /// strictly newer version replaces the current one.
    pub fn publish(
        &self,
        pack: RulePack,
    ) -> Result<Arc<RulePack>> {
        trace!("{}::publish({}@{})", StoreIden::Packs.as_ref(), pack.key, pack.version);
        let mut packs = self.packs.write().map_err(map_db_err)?;
        if let Some(current) = packs.get(&pack.key) {
            if current.version >= pack.version {
                return Err(RigflowError::Store(format!(
                    "pack '{}' is already published at version {}, refusing version {}",
                    pack.key, current.version, pack.version
                )));
            }
        }

        let pack = Arc::new(pack);
        packs.insert(pack.key.clone(), pack.clone());
        Ok(pack)
    }

    pub fn publish_json(
        &self,
        s: &str,
    ) -> Result<Arc<RulePack>> {
        self.publish(RulePack::from_json(s)?)
    }
}

impl PackStore for MemStore {
    fn get_pack_by_key(
        &self,
        key: &str,
    ) -> Result<Option<Arc<RulePack>>> {
        trace!("{}::get_pack_by_key({})", StoreIden::Packs.as_ref(), key);
        let packs = self.packs.read().map_err(map_db_err)?;
        Ok(packs.get(key).cloned())
    }
}

impl ActionStore for MemStore {
    fn list_actions_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ActionRecord>> {
        trace!("{}::list_actions_for_session({})", StoreIden::Actions.as_ref(), session_id);
        let actions = self.actions.read().map_err(map_db_err)?;
        Ok(actions.get(session_id).cloned().unwrap_or_default())
    }

    fn append_action(
        &self,
        session_id: &str,
        expected_len: usize,
        action: Action,
    ) -> Result<ActionRecord> {
        trace!("{}::append_action({}, {})", StoreIden::Actions.as_ref(), session_id, action.step_id);
        let mut actions = self.actions.write().map_err(map_db_err)?;
        let history = actions.entry(session_id.to_string()).or_default();
        if history.len() != expected_len {
            return Err(RigflowError::Conflict {
                expected: expected_len,
                actual: history.len(),
            });
        }

        let record = ActionRecord::new(session_id, action);
        history.push(record.clone());
        Ok(record)
    }
}
