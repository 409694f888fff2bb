use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contact::ContactId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

/// Append-only log entry tied to one contact. Never updated or deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: String,
    pub contact_id: ContactId,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub user_id: String,
    pub contact_id: ContactId,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub details: Option<serde_json::Value>,
}
