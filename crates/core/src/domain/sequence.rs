use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub String);

/// Follow-up sequence definition. Steps are kept as free-form JSON; this
/// layer only ever reports their count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FollowUpSequence {
    pub id: SequenceId,
    pub user_id: String,
    pub name: String,
    pub trigger_event: String,
    pub steps: Vec<serde_json::Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl FollowUpSequence {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
