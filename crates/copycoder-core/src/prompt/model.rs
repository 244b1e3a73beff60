use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated implementation specification.
///
/// Immutable once produced; a later generation supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompt {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Ids of the images the prompt was generated from, in input order.
    pub image_ids: Vec<String>,
}
