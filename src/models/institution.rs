//! Institution registry and yearly performance score models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "institution_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    University,
    AutonomousCollege,
    AffiliatedCollege,
    TechnicalInstitution,
    ResearchInstitute,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Institution {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub city: String,
    pub state: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub institution_type: InstitutionType,
    pub accreditation_status: Option<String>,
    pub naac_grade: Option<String>,
    pub nirf_rank: Option<i32>,
    pub established_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query filters for institution listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstitutionFilters {
    pub state: Option<String>,
    pub institution_type: Option<InstitutionType>,
    pub search: Option<String>,
}

impl InstitutionFilters {
    pub fn matches(&self, institution: &Institution) -> bool {
        if let Some(ref state) = self.state {
            if !institution.state.eq_ignore_ascii_case(state) {
                return false;
            }
        }
        if let Some(kind) = self.institution_type {
            if institution.institution_type != kind {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !institution.name.to_lowercase().contains(&needle)
                && !institution.city.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Component scores for one institution in one year.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PerformanceScore {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub year: i32,
    pub research_score: Option<f64>,
    pub placement_score: Option<f64>,
    pub infrastructure_score: Option<f64>,
    pub accreditation_score: Option<f64>,
    pub scheme_participation_score: Option<f64>,
    pub total_score: Option<f64>,
    pub rank: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the yearly ranking table.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct RankedInstitution {
    pub institution_id: Uuid,
    pub name: String,
    pub state: String,
    pub year: i32,
    pub total_score: Option<f64>,
    pub rank: Option<i32>,
}
