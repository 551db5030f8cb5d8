//! Compliance document model and its closed status/type enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// -- Enums matching PostgreSQL --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Flagged,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ResearchReport,
    Accreditation,
    RankingData,
    SchemeReport,
    PlacementData,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub uploaded_by: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub status: DocumentStatus,
    pub ai_confidence_score: Option<f64>,
    pub ai_extracted_data: Option<serde_json::Value>,
    pub sufficiency_score: Option<f64>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata for a file already placed in external storage.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    pub document_type: DocumentType,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 1024))]
    pub file_path: String,
    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
}

/// Fully resolved insert: the caller's institution and identity attached.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub institution_id: Uuid,
    pub uploaded_by: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
}

/// Equality filter for count-only queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCount {
    pub institution_id: Option<Uuid>,
    pub status: DocumentStatus,
}

impl DocumentCount {
    pub fn global(status: DocumentStatus) -> Self {
        Self {
            institution_id: None,
            status,
        }
    }

    pub fn scoped(institution_id: Uuid, status: DocumentStatus) -> Self {
        Self {
            institution_id: Some(institution_id),
            status,
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.status == self.status
            && self
                .institution_id
                .map_or(true, |id| document.institution_id == id)
    }
}

/// Query filters for document listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilters {
    pub status: Option<DocumentStatus>,
    pub document_type: Option<DocumentType>,
    pub institution_id: Option<Uuid>,
}

impl DocumentFilters {
    pub fn matches(&self, document: &Document) -> bool {
        self.status.map_or(true, |s| document.status == s)
            && self.document_type.map_or(true, |t| document.document_type == t)
            && self
                .institution_id
                .map_or(true, |id| document.institution_id == id)
    }
}

/// A validated status change, applied atomically with its audit record.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub document_id: Uuid,
    pub previous_status: DocumentStatus,
    pub new_status: DocumentStatus,
    pub actor_id: Uuid,
    /// Set when a reviewer acts; stamps reviewed_by/reviewed_at.
    pub review: bool,
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::UnderReview,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
            DocumentStatus::Flagged,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn create_document_rejects_empty_path() {
        let input = CreateDocument {
            document_type: DocumentType::Accreditation,
            file_name: "naac.pdf".to_string(),
            file_path: String::new(),
            file_size: Some(1024),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_document_rejects_negative_size() {
        let input = CreateDocument {
            document_type: DocumentType::PlacementData,
            file_name: "placements.xlsx".to_string(),
            file_path: "uploads/placements.xlsx".to_string(),
            file_size: Some(-1),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn scoped_count_only_matches_its_institution() {
        let inst = Uuid::new_v4();
        let doc = Document {
            id: Uuid::new_v4(),
            institution_id: Uuid::new_v4(),
            uploaded_by: Uuid::new_v4(),
            document_type: DocumentType::Other,
            file_name: "a.pdf".to_string(),
            file_path: "a.pdf".to_string(),
            file_size: None,
            status: DocumentStatus::Pending,
            ai_confidence_score: None,
            ai_extracted_data: None,
            sufficiency_score: None,
            reviewed_by: None,
            reviewed_at: None,
            reviewer_comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(DocumentCount::global(DocumentStatus::Pending).matches(&doc));
        assert!(!DocumentCount::scoped(inst, DocumentStatus::Pending).matches(&doc));
        assert!(!DocumentCount::global(DocumentStatus::Approved).matches(&doc));
    }
}
