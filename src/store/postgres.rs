//! PostgreSQL backend for [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{status_change_audit, upload_audit, Store, SINGLE_ROW_PROBE};
use crate::errors::AppError;
use crate::models::audit::{AuditFilters, AuditLog, CreateAuditLog};
use crate::models::document::{Document, DocumentCount, DocumentFilters, NewDocument, StatusChange};
use crate::models::institution::{Institution, InstitutionFilters, PerformanceScore, RankedInstitution};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::{AppRole, Profile, UpdateProfile};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with its own wildcards taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

const AUDIT_INSERT: &str = r#"
    INSERT INTO audit_logs (action, entity_type, entity_id, user_id, details, ip_address)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.full_name)
        .bind(&input.phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_roles(&self, user_id: Uuid) -> Result<Vec<AppRole>, AppError> {
        let roles = sqlx::query_scalar::<_, AppRole>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY created_at LIMIT $2",
        )
        .bind(user_id)
        .bind(SINGLE_ROW_PROBE)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn count_institutions(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM institutions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_documents(&self, filter: DocumentCount) -> Result<i64, AppError> {
        let count = match filter.institution_id {
            Some(institution_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM documents WHERE institution_id = $1 AND status = $2",
                )
                .bind(institution_id)
                .bind(filter.status)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents WHERE status = $1")
                    .bind(filter.status)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    async fn find_owned_institution_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM institutions WHERE user_id = $1 ORDER BY created_at LIMIT $2",
        )
        .bind(user_id)
        .bind(SINGLE_ROW_PROBE)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn find_institution(&self, id: Uuid) -> Result<Option<Institution>, AppError> {
        let institution =
            sqlx::query_as::<_, Institution>("SELECT * FROM institutions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(institution)
    }

    async fn list_institutions(
        &self,
        filters: &InstitutionFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Institution>, AppError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_index = 0u32;

        if filters.state.is_some() {
            param_index += 1;
            conditions.push(format!("LOWER(state) = LOWER(${param_index})"));
        }
        if filters.institution_type.is_some() {
            param_index += 1;
            conditions.push(format!("type = ${param_index}"));
        }
        if filters.search.is_some() {
            param_index += 1;
            conditions.push(format!(
                r"(name ILIKE ${param_index} ESCAPE '\' OR city ILIKE ${param_index} ESCAPE '\')"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM institutions {where_clause}");
        let data_sql = format!(
            "SELECT * FROM institutions {where_clause} ORDER BY name ASC LIMIT {} OFFSET {}",
            pagination.limit(),
            pagination.offset()
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut data_query = sqlx::query_as::<_, Institution>(&data_sql);

        if let Some(ref state) = filters.state {
            count_query = count_query.bind(state.clone());
            data_query = data_query.bind(state.clone());
        }
        if let Some(kind) = filters.institution_type {
            count_query = count_query.bind(kind);
            data_query = data_query.bind(kind);
        }
        if let Some(ref search) = filters.search {
            let pattern = contains_pattern(search);
            count_query = count_query.bind(pattern.clone());
            data_query = data_query.bind(pattern);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let items = data_query.fetch_all(&self.pool).await?;

        Ok(PagedResult::new(items, total, pagination))
    }

    async fn insert_document(&self, input: &NewDocument) -> Result<Document, AppError> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (institution_id, uploaded_by, document_type, file_name, file_path, file_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.institution_id)
        .bind(input.uploaded_by)
        .bind(input.document_type)
        .bind(&input.file_name)
        .bind(&input.file_path)
        .bind(input.file_size)
        .fetch_one(&mut *tx)
        .await?;

        let audit = upload_audit(&document);
        sqlx::query(AUDIT_INSERT)
            .bind(&audit.action)
            .bind(&audit.entity_type)
            .bind(audit.entity_id)
            .bind(audit.user_id)
            .bind(&audit.details)
            .bind(&audit.ip_address)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    async fn find_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn list_documents(
        &self,
        filters: &DocumentFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Document>, AppError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_index = 0u32;

        if filters.status.is_some() {
            param_index += 1;
            conditions.push(format!("status = ${param_index}"));
        }
        if filters.document_type.is_some() {
            param_index += 1;
            conditions.push(format!("document_type = ${param_index}"));
        }
        if filters.institution_id.is_some() {
            param_index += 1;
            conditions.push(format!("institution_id = ${param_index}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM documents {where_clause}");
        let data_sql = format!(
            "SELECT * FROM documents {where_clause} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            pagination.limit(),
            pagination.offset()
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut data_query = sqlx::query_as::<_, Document>(&data_sql);

        macro_rules! bind_both {
            ($val:expr) => {
                count_query = count_query.bind($val);
                data_query = data_query.bind($val);
            };
        }

        if let Some(status) = filters.status {
            bind_both!(status);
        }
        if let Some(document_type) = filters.document_type {
            bind_both!(document_type);
        }
        if let Some(institution_id) = filters.institution_id {
            bind_both!(institution_id);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let items = data_query.fetch_all(&self.pool).await?;

        Ok(PagedResult::new(items, total, pagination))
    }

    async fn apply_status_change(&self, change: &StatusChange) -> Result<Document, AppError> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET
                status = $3,
                reviewed_by = CASE WHEN $4 THEN $5 ELSE reviewed_by END,
                reviewed_at = CASE WHEN $4 THEN NOW() ELSE reviewed_at END,
                reviewer_comments = CASE WHEN $4 THEN $6 ELSE reviewer_comments END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(change.document_id)
        .bind(change.previous_status)
        .bind(change.new_status)
        .bind(change.review)
        .bind(change.actor_id)
        .bind(&change.comments)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Document status changed while the review was in progress".to_string())
        })?;

        let audit = status_change_audit(change);
        sqlx::query(AUDIT_INSERT)
            .bind(&audit.action)
            .bind(&audit.entity_type)
            .bind(audit.entity_id)
            .bind(audit.user_id)
            .bind(&audit.details)
            .bind(&audit.ip_address)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    async fn list_scores(&self, institution_id: Uuid) -> Result<Vec<PerformanceScore>, AppError> {
        let scores = sqlx::query_as::<_, PerformanceScore>(
            "SELECT * FROM performance_scores WHERE institution_id = $1 ORDER BY year DESC",
        )
        .bind(institution_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(scores)
    }

    async fn list_rankings(
        &self,
        year: i32,
        limit: i64,
    ) -> Result<Vec<RankedInstitution>, AppError> {
        let rows = sqlx::query_as::<_, RankedInstitution>(
            r#"
            SELECT
                ps.institution_id,
                i.name,
                i.state,
                ps.year,
                ps.total_score,
                ps.rank
            FROM performance_scores ps
            INNER JOIN institutions i ON i.id = ps.institution_id
            WHERE ps.year = $1
            ORDER BY ps.rank ASC NULLS LAST, ps.total_score DESC NULLS LAST, i.name ASC
            LIMIT $2
            "#,
        )
        .bind(year)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<(), AppError> {
        sqlx::query(AUDIT_INSERT)
            .bind(&entry.action)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.user_id)
            .bind(&entry.details)
            .bind(&entry.ip_address)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_audit_logs(
        &self,
        filters: &AuditFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<AuditLog>, AppError> {
        // $1/$2 are nullable so the same statement serves every filter combination.
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM audit_logs
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            "#,
        )
        .bind(&filters.entity_type)
        .bind(filters.user_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filters.entity_type)
        .bind(filters.user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult::new(items, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_wraps_plain_text() {
        assert_eq!(contains_pattern("Pune"), "%Pune%");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
