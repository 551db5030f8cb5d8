//! Institution lookup and performance score queries.

use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::institution::{
    Institution, InstitutionFilters, PerformanceScore, RankedInstitution,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::store::Store;

const DEFAULT_RANKING_LIMIT: i64 = 10;
const MAX_RANKING_LIMIT: i64 = 100;

/// Query parameters for the yearly ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingQuery {
    pub year: i32,
    pub limit: Option<i64>,
}

impl RankingQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_RANKING_LIMIT)
            .clamp(1, MAX_RANKING_LIMIT)
    }
}

pub async fn list(
    store: &dyn Store,
    filters: &InstitutionFilters,
    pagination: &Pagination,
) -> Result<PagedResult<Institution>, AppError> {
    store.list_institutions(filters, pagination).await
}

pub async fn find_by_id(store: &dyn Store, id: Uuid) -> Result<Institution, AppError> {
    store
        .find_institution(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Institution not found".to_string()))
}

/// Yearly scores of one institution, newest first.
pub async fn scores(store: &dyn Store, institution_id: Uuid) -> Result<Vec<PerformanceScore>, AppError> {
    // distinguish "unknown institution" from "no scores yet"
    find_by_id(store, institution_id).await?;
    store.list_scores(institution_id).await
}

pub async fn rankings(
    store: &dyn Store,
    query: &RankingQuery,
) -> Result<Vec<RankedInstitution>, AppError> {
    if !(1900..=2200).contains(&query.year) {
        return Err(AppError::Validation(format!(
            "year {} is out of range",
            query.year
        )));
    }
    store.list_rankings(query.year, query.limit()).await
}
