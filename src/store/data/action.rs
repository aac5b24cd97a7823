use serde::{Deserialize, Serialize};

use crate::{model::Action, utils};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub id: String,
    pub session_id: String,

    pub action: Action,
    pub create_time: i64,
}

impl ActionRecord {
    pub fn new(
        session_id: &str,
        action: Action,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            action,
            create_time: utils::time::time_millis(),
        }
    }
}
