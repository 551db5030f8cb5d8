//! Audit log queries.

use crate::errors::AppError;
use crate::models::audit::{AuditFilters, AuditLog};
use crate::models::pagination::{PagedResult, Pagination};
use crate::store::Store;

pub async fn list(
    store: &dyn Store,
    filters: &AuditFilters,
    pagination: &Pagination,
) -> Result<PagedResult<AuditLog>, AppError> {
    store.list_audit_logs(filters, pagination).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::CreateAuditLog;
    use crate::store::{MemoryStore, Store};
    use uuid::Uuid;

    fn entry(action: &str, entity_type: &str, user_id: Uuid) -> CreateAuditLog {
        CreateAuditLog {
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: None,
            user_id: Some(user_id),
            details: None,
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn newest_first_and_filtered() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert_audit_log(&entry("sign_out", "session", alice)).await.unwrap();
        store.insert_audit_log(&entry("status_change", "document", bob)).await.unwrap();
        store.insert_audit_log(&entry("sign_out", "session", bob)).await.unwrap();

        let all = list(&store, &AuditFilters::default(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items[0].user_id, Some(bob));
        assert_eq!(all.items[0].action, "sign_out");

        let bobs_sessions = AuditFilters {
            entity_type: Some("session".to_string()),
            user_id: Some(bob),
        };
        let page = list(&store, &bobs_sessions, &Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }
}
