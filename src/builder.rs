use std::sync::Arc;

use crate::{
    Assistant, Config, Result,
    store::{ActionStore, MemStore, PackStore},
};

/// Builds an [`Assistant`]. Stores left unset share one in-memory [`MemStore`].
#[derive(Default)]
pub struct AssistantBuilder {
    config: Option<Config>,
    packs: Option<Arc<dyn PackStore>>,
    actions: Option<Arc<dyn ActionStore>>,
}

impl AssistantBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a TOML file.
    pub fn config_file(
        mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self> {
        self.config = Some(Config::create(path)?);
        Ok(self)
    }

    pub fn pack_store(
        mut self,
        store: impl PackStore + 'static,
    ) -> Self {
        self.packs = Some(Arc::new(store));
        self
    }

    pub fn action_store(
        mut self,
        store: impl ActionStore + 'static,
    ) -> Self {
        self.actions = Some(Arc::new(store));
        self
    }

    pub fn build(self) -> Result<Assistant> {
        let mem = MemStore::new();
        let packs = self.packs.unwrap_or_else(|| Arc::new(mem.clone()));
        let actions = self.actions.unwrap_or_else(|| Arc::new(mem));

        Ok(Assistant::new_with_config(self.config.unwrap_or_default(), packs, actions))
    }
}
