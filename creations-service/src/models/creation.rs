//! Creation records: the append-only log of generated content.

use super::operation::CreationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Creation {
    #[serde(rename = "id")]
    pub creation_id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: CreationKind,
    pub publish: bool,
    #[serde(rename = "created_at")]
    pub created_utc: DateTime<Utc>,
}

/// Input for inserting a creation.
#[derive(Debug, Clone)]
pub struct NewCreation {
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    pub kind: CreationKind,
    pub publish: bool,
}

impl NewCreation {
    /// Materialize the row the store would write, stamping id and time.
    pub fn into_creation(self) -> Creation {
        Creation {
            creation_id: Uuid::new_v4(),
            user_id: self.user_id,
            prompt: self.prompt,
            content: self.content,
            kind: self.kind,
            publish: self.publish,
            created_utc: Utc::now(),
        }
    }
}
