use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A filter row as stored by the backend.
///
/// `additional_settings` carries the filter-type specific settings as raw
/// JSON; each filter type parses it into its own typed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRecord {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub additional_settings: serde_json::Value,
}
