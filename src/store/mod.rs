//! Data-store seam between the services and the backing database.
//!
//! Services hold the business rules (exactly-one checks, role scoping,
//! transition validation); a [`Store`] only answers equality-filtered reads,
//! count-only queries and the few writes the lifecycle needs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::audit::{AuditFilters, AuditLog, CreateAuditLog};
use crate::models::document::{Document, DocumentCount, DocumentFilters, NewDocument, StatusChange};
use crate::models::institution::{Institution, InstitutionFilters, PerformanceScore, RankedInstitution};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::{AppRole, Profile, UpdateProfile};

/// Rows fetched when exactly one is expected: enough to tell "none",
/// "one" and "ambiguous" apart without reading the whole set.
pub const SINGLE_ROW_PROBE: i64 = 2;

#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backend, used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn update_profile(
        &self,
        id: Uuid,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, AppError>;

    /// Role rows for a user, at most [`SINGLE_ROW_PROBE`].
    async fn find_roles(&self, user_id: Uuid) -> Result<Vec<AppRole>, AppError>;

    async fn count_institutions(&self) -> Result<i64, AppError>;

    async fn count_documents(&self, filter: DocumentCount) -> Result<i64, AppError>;

    /// Ids of institutions owned by a user, at most [`SINGLE_ROW_PROBE`].
    async fn find_owned_institution_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn find_institution(&self, id: Uuid) -> Result<Option<Institution>, AppError>;

    async fn list_institutions(
        &self,
        filters: &InstitutionFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Institution>, AppError>;

    /// Insert a pending document together with its `document_uploaded` audit entry.
    async fn insert_document(&self, input: &NewDocument) -> Result<Document, AppError>;

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    async fn list_documents(
        &self,
        filters: &DocumentFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Document>, AppError>;

    /// Apply a status change only if the document is still in
    /// `previous_status`, writing the audit entry in the same unit.
    /// Returns `Conflict` when the status moved underneath the caller.
    async fn apply_status_change(&self, change: &StatusChange) -> Result<Document, AppError>;

    /// Yearly scores for one institution, newest year first.
    async fn list_scores(&self, institution_id: Uuid) -> Result<Vec<PerformanceScore>, AppError>;

    async fn list_rankings(&self, year: i32, limit: i64)
        -> Result<Vec<RankedInstitution>, AppError>;

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<(), AppError>;

    /// Audit entries, newest first.
    async fn list_audit_logs(
        &self,
        filters: &AuditFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<AuditLog>, AppError>;
}

/// Audit payload shared by both backends for a status change.
pub(crate) fn status_change_audit(change: &StatusChange) -> CreateAuditLog {
    CreateAuditLog {
        action: "status_change".to_string(),
        entity_type: "document".to_string(),
        entity_id: Some(change.document_id),
        user_id: Some(change.actor_id),
        details: Some(serde_json::json!({
            "previous_status": change.previous_status.as_str(),
            "new_status": change.new_status.as_str(),
            "comments": change.comments,
        })),
        ip_address: None,
    }
}

/// Audit payload shared by both backends for a document registration.
pub(crate) fn upload_audit(document: &Document) -> CreateAuditLog {
    CreateAuditLog {
        action: "document_uploaded".to_string(),
        entity_type: "document".to_string(),
        entity_id: Some(document.id),
        user_id: Some(document.uploaded_by),
        details: Some(serde_json::json!({
            "institution_id": document.institution_id,
            "file_name": document.file_name,
            "document_type": document.document_type,
        })),
        ip_address: None,
    }
}
