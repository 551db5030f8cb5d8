//! Role-scoped document and institution counts for the dashboard.
//!
//! Each count is an independent read issued concurrently; there is no
//! snapshot across them, so a summary may mix instants if documents change
//! mid-computation. Any failed count fails the whole summary: a missing
//! number is never reported as zero.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentCount, DocumentStatus};
use crate::models::user::AppRole;
use crate::store::Store;

/// Aggregated counts shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_institutions: i64,
    pub pending_documents: i64,
    pub approved_documents: i64,
    pub under_review: i64,
}

/// Which rows a summary is computed over.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatsScope {
    /// Every institution and document on the platform.
    Global,
    /// Only documents of the caller's institution.
    Institution { institution_id: Uuid },
    /// Nothing to aggregate: a public user, or an institution user with no
    /// institution registered yet.
    Unscoped,
}

/// Decide the aggregation scope for a role.
pub async fn resolve_scope(
    store: &dyn Store,
    role: AppRole,
    user_id: Uuid,
) -> Result<StatsScope, AppError> {
    match role {
        AppRole::Reviewer | AppRole::Admin => Ok(StatsScope::Global),
        AppRole::Institution => {
            let owned = store.find_owned_institution_ids(user_id).await?;
            match owned.as_slice() {
                [] => Ok(StatsScope::Unscoped),
                [institution_id] => Ok(StatsScope::Institution {
                    institution_id: *institution_id,
                }),
                _ => Err(AppError::Conflict(
                    "User owns more than one institution".to_string(),
                )),
            }
        }
        AppRole::Public => Ok(StatsScope::Unscoped),
    }
}

/// Compute the counts for an already resolved scope.
pub async fn stats_for_scope(
    store: &dyn Store,
    scope: StatsScope,
) -> Result<StatsSummary, AppError> {
    match scope {
        StatsScope::Global => {
            let (total_institutions, pending_documents, approved_documents, under_review) = tokio::try_join!(
                store.count_institutions(),
                store.count_documents(DocumentCount::global(DocumentStatus::Pending)),
                store.count_documents(DocumentCount::global(DocumentStatus::Approved)),
                store.count_documents(DocumentCount::global(DocumentStatus::UnderReview)),
            )?;

            Ok(StatsSummary {
                total_institutions,
                pending_documents,
                approved_documents,
                under_review,
            })
        }
        StatsScope::Institution { institution_id } => {
            let (pending_documents, approved_documents, under_review) = tokio::try_join!(
                store.count_documents(DocumentCount::scoped(institution_id, DocumentStatus::Pending)),
                store.count_documents(DocumentCount::scoped(institution_id, DocumentStatus::Approved)),
                store.count_documents(DocumentCount::scoped(institution_id, DocumentStatus::UnderReview)),
            )?;

            Ok(StatsSummary {
                total_institutions: 1,
                pending_documents,
                approved_documents,
                under_review,
            })
        }
        StatsScope::Unscoped => Ok(StatsSummary::default()),
    }
}

/// Resolve the scope for `role` and compute its summary.
pub async fn compute_stats(
    store: &dyn Store,
    role: AppRole,
    user_id: Uuid,
) -> Result<StatsSummary, AppError> {
    let scope = resolve_scope(store, role, user_id).await?;
    stats_for_scope(store, scope).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seed_documents(
        store: &MemoryStore,
        institution_id: Uuid,
        uploader: Uuid,
        pending: usize,
        approved: usize,
        under_review: usize,
    ) {
        for (status, n) in [
            (DocumentStatus::Pending, pending),
            (DocumentStatus::Approved, approved),
            (DocumentStatus::UnderReview, under_review),
        ] {
            for _ in 0..n {
                store.add_document(institution_id, uploader, status).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn institution_user_gets_scoped_counts() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let own = store
            .add_institution("IIT Madras", "Chennai", "Tamil Nadu", Some(owner))
            .unwrap();
        let other = store
            .add_institution("IIT Bombay", "Mumbai", "Maharashtra", Some(Uuid::new_v4()))
            .unwrap();
        seed_documents(&store, own.id, owner, 3, 2, 1);
        seed_documents(&store, other.id, Uuid::new_v4(), 5, 5, 5);
        store
            .add_document(own.id, owner, DocumentStatus::Rejected)
            .unwrap();

        let stats = compute_stats(&store, AppRole::Institution, owner).await.unwrap();
        assert_eq!(
            stats,
            StatsSummary {
                total_institutions: 1,
                pending_documents: 3,
                approved_documents: 2,
                under_review: 1,
            }
        );
    }

    #[tokio::test]
    async fn admin_gets_global_counts() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..10 {
            let inst = store
                .add_institution(&format!("College {i}"), "Pune", "Maharashtra", None)
                .unwrap();
            ids.push(inst.id);
        }
        let uploader = Uuid::new_v4();
        seed_documents(&store, ids[0], uploader, 4, 0, 1);
        seed_documents(&store, ids[1], uploader, 0, 5, 0);

        let stats = compute_stats(&store, AppRole::Admin, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(
            stats,
            StatsSummary {
                total_institutions: 10,
                pending_documents: 4,
                approved_documents: 5,
                under_review: 1,
            }
        );
    }

    #[tokio::test]
    async fn reviewer_counts_ignore_identity() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let inst = store
            .add_institution("NIT Trichy", "Tiruchirappalli", "Tamil Nadu", Some(owner))
            .unwrap();
        store.add_institution("IISc", "Bengaluru", "Karnataka", None).unwrap();
        seed_documents(&store, inst.id, owner, 2, 1, 0);

        let as_owner = compute_stats(&store, AppRole::Reviewer, owner).await.unwrap();
        let as_stranger = compute_stats(&store, AppRole::Reviewer, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(as_owner, as_stranger);
        assert_eq!(as_owner.total_institutions, 2);
    }

    #[tokio::test]
    async fn institution_user_without_institution_gets_zero_summary() {
        let store = MemoryStore::new();
        store.add_institution("IIT Delhi", "New Delhi", "Delhi", None).unwrap();
        let stats = compute_stats(&store, AppRole::Institution, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(stats, StatsSummary::default());
    }

    #[tokio::test]
    async fn institution_user_with_two_institutions_is_conflict() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.add_institution("Campus A", "Agra", "Uttar Pradesh", Some(owner)).unwrap();
        store.add_institution("Campus B", "Kanpur", "Uttar Pradesh", Some(owner)).unwrap();
        let err = compute_stats(&store, AppRole::Institution, owner).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn public_role_gets_zero_summary_without_querying() {
        let store = MemoryStore::new();
        store.add_institution("IIT Kanpur", "Kanpur", "Uttar Pradesh", None).unwrap();
        // counts would fail if they were issued
        store.set_fail_counts(true);
        let stats = compute_stats(&store, AppRole::Public, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(stats, StatsSummary::default());
    }

    #[tokio::test]
    async fn failed_count_is_an_error_not_zero() {
        let store = MemoryStore::new();
        store.set_fail_counts(true);
        let result = compute_stats(&store, AppRole::Admin, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn repeated_computation_is_stable() {
        let store = MemoryStore::new();
        let inst = store.add_institution("BHU", "Varanasi", "Uttar Pradesh", None).unwrap();
        seed_documents(&store, inst.id, Uuid::new_v4(), 1, 2, 3);
        let first = compute_stats(&store, AppRole::Admin, Uuid::new_v4()).await.unwrap();
        let second = compute_stats(&store, AppRole::Admin, Uuid::new_v4()).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scope_serializes_with_kind_tag() {
        let id = Uuid::nil();
        let json = serde_json::to_value(StatsScope::Institution { institution_id: id }).unwrap();
        assert_eq!(json["kind"], "institution");
        assert_eq!(json["institution_id"], id.to_string());
        let json = serde_json::to_value(StatsScope::Unscoped).unwrap();
        assert_eq!(json["kind"], "unscoped");
    }
}
