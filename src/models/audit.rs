//! Append-only audit log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLog {
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

/// Query filters for audit log listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilters {
    pub entity_type: Option<String>,
    pub user_id: Option<Uuid>,
}

impl AuditFilters {
    pub fn matches(&self, entry: &AuditLog) -> bool {
        self.entity_type
            .as_deref()
            .map_or(true, |t| entry.entity_type == t)
            && self.user_id.map_or(true, |u| entry.user_id == Some(u))
    }
}
