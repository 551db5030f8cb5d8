//! In-process [`Store`] used by tests and local demos.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{status_change_audit, upload_audit, Store, SINGLE_ROW_PROBE};
use crate::errors::AppError;
use crate::models::audit::{AuditFilters, AuditLog, CreateAuditLog};
use crate::models::document::{
    Document, DocumentCount, DocumentFilters, DocumentStatus, DocumentType, NewDocument,
    StatusChange,
};
use crate::models::institution::{
    Institution, InstitutionFilters, InstitutionType, PerformanceScore, RankedInstitution,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::{AppRole, Profile, UpdateProfile, UserRoleAssignment};

#[derive(Debug, Default)]
struct Tables {
    profiles: Vec<Profile>,
    user_roles: Vec<UserRoleAssignment>,
    institutions: Vec<Institution>,
    documents: Vec<Document>,
    performance_scores: Vec<PerformanceScore>,
    audit_logs: Vec<AuditLog>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    read_delay: RwLock<Option<Duration>>,
    fail_counts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    /// Delay every count query, to exercise dashboard timeouts.
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.read_delay.write() {
            *slot = delay;
        }
    }

    /// Make every count query fail as if the backend were unreachable.
    pub fn set_fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }

    async fn before_count(&self) -> Result<(), AppError> {
        let delay = self.read_delay.read().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn insert_profile(&self, id: Uuid, email: &str, full_name: &str) -> Result<Profile, AppError> {
        let now = Utc::now();
        let profile = Profile {
            id,
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone: None,
            created_at: now,
            updated_at: now,
        };
        self.write()?.profiles.push(profile.clone());
        Ok(profile)
    }

    pub fn assign_role(&self, user_id: Uuid, role: AppRole) -> Result<(), AppError> {
        self.write()?.user_roles.push(UserRoleAssignment {
            id: Uuid::new_v4(),
            user_id,
            role,
            created_at: Utc::now(),
        });
        Ok(())
    }

    /// Seed an institution, optionally owned by a user.
    pub fn add_institution(
        &self,
        name: &str,
        city: &str,
        state: &str,
        owner: Option<Uuid>,
    ) -> Result<Institution, AppError> {
        let now = Utc::now();
        let institution = Institution {
            id: Uuid::now_v7(),
            user_id: owner,
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            institution_type: InstitutionType::University,
            accreditation_status: None,
            naac_grade: None,
            nirf_rank: None,
            established_year: None,
            created_at: now,
            updated_at: now,
        };
        self.write()?.institutions.push(institution.clone());
        Ok(institution)
    }

    /// Seed a document already in the given status.
    pub fn add_document(
        &self,
        institution_id: Uuid,
        uploaded_by: Uuid,
        status: DocumentStatus,
    ) -> Result<Document, AppError> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::now_v7(),
            institution_id,
            uploaded_by,
            document_type: DocumentType::Accreditation,
            file_name: "naac_ssr.pdf".to_string(),
            file_path: format!("{institution_id}/naac_ssr.pdf"),
            file_size: Some(2_048_000),
            status,
            ai_confidence_score: None,
            ai_extracted_data: None,
            sufficiency_score: None,
            reviewed_by: None,
            reviewed_at: None,
            reviewer_comments: None,
            created_at: now,
            updated_at: now,
        };
        self.write()?.documents.push(document.clone());
        Ok(document)
    }

    /// Seed a yearly score row.
    pub fn add_score(
        &self,
        institution_id: Uuid,
        year: i32,
        total_score: Option<f64>,
        rank: Option<i32>,
    ) -> Result<PerformanceScore, AppError> {
        let now = Utc::now();
        let score = PerformanceScore {
            id: Uuid::now_v7(),
            institution_id,
            year,
            research_score: None,
            placement_score: None,
            infrastructure_score: None,
            accreditation_score: None,
            scheme_participation_score: None,
            total_score,
            rank,
            created_at: now,
            updated_at: now,
        };
        self.write()?.performance_scores.push(score.clone());
        Ok(score)
    }

    pub fn audit_entries(&self) -> Result<Vec<AuditLog>, AppError> {
        Ok(self.read()?.audit_logs.clone())
    }

    fn push_audit(tables: &mut Tables, entry: &CreateAuditLog) {
        tables.audit_logs.push(AuditLog {
            id: Uuid::now_v7(),
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            user_id: entry.user_id,
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.read()?.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, AppError> {
        let mut tables = self.write()?;
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(ref full_name) = input.full_name {
            profile.full_name = full_name.clone();
        }
        if let Some(ref phone) = input.phone {
            profile.phone = Some(phone.clone());
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn find_roles(&self, user_id: Uuid) -> Result<Vec<AppRole>, AppError> {
        Ok(self
            .read()?
            .user_roles
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.role)
            .take(SINGLE_ROW_PROBE as usize)
            .collect())
    }

    async fn count_institutions(&self) -> Result<i64, AppError> {
        self.before_count().await?;
        Ok(self.read()?.institutions.len() as i64)
    }

    async fn count_documents(&self, filter: DocumentCount) -> Result<i64, AppError> {
        self.before_count().await?;
        Ok(self
            .read()?
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .count() as i64)
    }

    async fn find_owned_institution_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .read()?
            .institutions
            .iter()
            .filter(|i| i.user_id == Some(user_id))
            .map(|i| i.id)
            .take(SINGLE_ROW_PROBE as usize)
            .collect())
    }

    async fn find_institution(&self, id: Uuid) -> Result<Option<Institution>, AppError> {
        Ok(self.read()?.institutions.iter().find(|i| i.id == id).cloned())
    }

    async fn list_institutions(
        &self,
        filters: &InstitutionFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Institution>, AppError> {
        let mut matching: Vec<Institution> = self
            .read()?
            .institutions
            .iter()
            .filter(|i| filters.matches(i))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(PagedResult::from_all(matching, pagination))
    }

    async fn insert_document(&self, input: &NewDocument) -> Result<Document, AppError> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::now_v7(),
            institution_id: input.institution_id,
            uploaded_by: input.uploaded_by,
            document_type: input.document_type,
            file_name: input.file_name.clone(),
            file_path: input.file_path.clone(),
            file_size: input.file_size,
            status: DocumentStatus::Pending,
            ai_confidence_score: None,
            ai_extracted_data: None,
            sufficiency_score: None,
            reviewed_by: None,
            reviewed_at: None,
            reviewer_comments: None,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.write()?;
        tables.documents.push(document.clone());
        Self::push_audit(&mut tables, &upload_audit(&document));
        Ok(document)
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self.read()?.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(
        &self,
        filters: &DocumentFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Document>, AppError> {
        let mut matching: Vec<Document> = self
            .read()?
            .documents
            .iter()
            .filter(|d| filters.matches(d))
            .cloned()
            .collect();
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PagedResult::from_all(matching, pagination))
    }

    async fn apply_status_change(&self, change: &StatusChange) -> Result<Document, AppError> {
        let mut tables = self.write()?;
        let document = tables
            .documents
            .iter_mut()
            .find(|d| d.id == change.document_id && d.status == change.previous_status)
            .ok_or_else(|| {
                AppError::Conflict(
                    "Document status changed while the review was in progress".to_string(),
                )
            })?;

        let now = Utc::now();
        document.status = change.new_status;
        if change.review {
            document.reviewed_by = Some(change.actor_id);
            document.reviewed_at = Some(now);
            document.reviewer_comments = change.comments.clone();
        }
        document.updated_at = now;
        let updated = document.clone();

        Self::push_audit(&mut tables, &status_change_audit(change));
        Ok(updated)
    }

    async fn list_scores(&self, institution_id: Uuid) -> Result<Vec<PerformanceScore>, AppError> {
        let mut scores: Vec<PerformanceScore> = self
            .read()?
            .performance_scores
            .iter()
            .filter(|s| s.institution_id == institution_id)
            .cloned()
            .collect();
        scores.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(scores)
    }

    async fn list_rankings(
        &self,
        year: i32,
        limit: i64,
    ) -> Result<Vec<RankedInstitution>, AppError> {
        let tables = self.read()?;
        let mut rows: Vec<RankedInstitution> = tables
            .performance_scores
            .iter()
            .filter(|s| s.year == year)
            .filter_map(|s| {
                tables
                    .institutions
                    .iter()
                    .find(|i| i.id == s.institution_id)
                    .map(|i| RankedInstitution {
                        institution_id: i.id,
                        name: i.name.clone(),
                        state: i.state.clone(),
                        year: s.year,
                        total_score: s.total_score,
                        rank: s.rank,
                    })
            })
            .collect();

        // rank ascending with nulls last, then total score descending with nulls last
        rows.sort_by(|a, b| {
            let by_rank = match (a.rank, b.rank) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            let by_score = match (a.total_score, b.total_score) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_rank.then(by_score).then_with(|| a.name.cmp(&b.name))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<(), AppError> {
        Self::push_audit(&mut *self.write()?, entry);
        Ok(())
    }

    async fn list_audit_logs(
        &self,
        filters: &AuditFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<AuditLog>, AppError> {
        let mut matching: Vec<AuditLog> = self
            .read()?
            .audit_logs
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect();
        // append-only, so insertion order is chronological
        matching.reverse();
        Ok(PagedResult::from_all(matching, pagination))
    }
}
