//! Storage layer for published rule packs and session histories.
//!
//! The assistant only talks to the [`PackStore`] and [`ActionStore`] traits.
//! `MemStore` implements both in memory for tests and embedding.

pub mod data;
mod db;

use std::{error::Error, sync::Arc};

use strum::AsRefStr;

use crate::{RigflowError, Result, model::Action, pack::RulePack};

use data::ActionRecord;

pub use db::MemStore;

/// Maps backend errors to RigflowError.
fn map_db_err(err: impl Error) -> RigflowError {
    RigflowError::Store(err.to_string())
}

/// Identifiers for different storage collections.
#[derive(Debug, Clone, AsRefStr, PartialEq, Hash, Eq)]
pub enum StoreIden {
    /// Published rule packs.
    #[strum(serialize = "packs")]
    Packs,
    /// Per-session action histories.
    #[strum(serialize = "actions")]
    Actions,
}

/// Read access to published rule packs.
///
/// A published `key@version` is immutable. Corrections are published under a
/// newer version.
pub trait PackStore: Send + Sync {
    /// Latest published pack for `key`, if any.
    fn get_pack_by_key(
        &self,
        key: &str,
    ) -> Result<Option<Arc<RulePack>>>;
}

/// Append-only per-session history.
pub trait ActionStore: Send + Sync {
    /// Session history in submission order. Unknown sessions are empty.
    fn list_actions_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ActionRecord>>;

    /// Append `action` if the session still holds exactly `expected_len`
    /// entries, otherwise fail with [`RigflowError::Conflict`].
    fn append_action(
        &self,
        session_id: &str,
        expected_len: usize,
        action: Action,
    ) -> Result<ActionRecord>;
}
