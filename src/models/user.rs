//! User profile and role assignment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    Institution,
    Reviewer,
    Admin,
    Public,
}

impl AppRole {
    /// Reviewers and admins see platform-wide data.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Reviewer | Self::Admin)
    }
}

/// Profile row, one per authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of `user_roles`. The dashboard expects exactly one per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRoleAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_role_serialization() {
        let json = serde_json::to_string(&AppRole::Institution).unwrap();
        assert_eq!(json, "\"institution\"");
        let role: AppRole = serde_json::from_str("\"reviewer\"").unwrap();
        assert_eq!(role, AppRole::Reviewer);
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(serde_json::from_str::<AppRole>("\"superuser\"").is_err());
    }

    #[test]
    fn privileged_roles() {
        assert!(AppRole::Admin.is_privileged());
        assert!(AppRole::Reviewer.is_privileged());
        assert!(!AppRole::Institution.is_privileged());
        assert!(!AppRole::Public.is_privileged());
    }

    #[test]
    fn update_profile_validation() {
        let ok = UpdateProfile {
            full_name: Some("Registrar, IIT Madras".to_string()),
            phone: None,
        };
        assert!(ok.validate().is_ok());

        let empty_name = UpdateProfile {
            full_name: Some(String::new()),
            phone: None,
        };
        assert!(empty_name.validate().is_err());

        let short_phone = UpdateProfile {
            full_name: None,
            phone: Some("123".to_string()),
        };
        assert!(short_phone.validate().is_err());
    }
}
