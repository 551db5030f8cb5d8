//! Document review state machine with role-checked transitions.
//!
//! Validates that a status change follows the allowed graph, that the actor
//! holds a permitted role (and owns the document when acting as an
//! institution), and that rejections and flags carry reviewer comments.
//! Every transition is written together with an audit_logs entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{Document, DocumentStatus, StatusChange};
use crate::models::user::AppRole;
use crate::services::documents::owned_institution;
use crate::store::Store;

/// Request to move a document to a new status.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub new_status: DocumentStatus,
    pub comments: Option<String>,
}

/// Actor performing a transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionActor {
    pub id: Uuid,
    pub role: AppRole,
}

/// Result of a successful transition.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub document_id: Uuid,
    pub previous_status: DocumentStatus,
    pub new_status: DocumentStatus,
    pub document: Document,
}

/// Check whether a status transition is an edge of the review graph.
pub fn is_valid_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
    use crate::models::document::DocumentStatus::*;
    matches!(
        (from, to),
        (Pending, UnderReview)
            | (UnderReview, Approved)
            | (UnderReview, Rejected)
            | (UnderReview, Flagged)
            | (Flagged, UnderReview)
            // resubmission after rejection
            | (Rejected, Pending)
    )
}

/// Roles allowed to move a document into a given status.
pub fn required_roles(to: DocumentStatus) -> &'static [AppRole] {
    match to {
        DocumentStatus::Pending => &[AppRole::Institution, AppRole::Admin],
        DocumentStatus::UnderReview
        | DocumentStatus::Approved
        | DocumentStatus::Rejected
        | DocumentStatus::Flagged => &[AppRole::Reviewer, AppRole::Admin],
    }
}

pub fn has_required_role(actor_role: AppRole, to: DocumentStatus) -> bool {
    required_roles(to).contains(&actor_role)
}

/// Whether the target status records a review decision on the document.
pub fn is_review_decision(to: DocumentStatus) -> bool {
    !matches!(to, DocumentStatus::Pending)
}

/// Validate all preconditions for a transition that do not need the store.
pub fn validate_transition(
    from: DocumentStatus,
    to: DocumentStatus,
    actor_role: AppRole,
    comments: Option<&str>,
) -> Result<(), AppError> {
    if !is_valid_transition(from, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot transition from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    if !has_required_role(actor_role, to) {
        return Err(AppError::Forbidden(format!(
            "Role {actor_role:?} cannot move a document to {}",
            to.as_str()
        )));
    }

    let has_comments = comments.is_some_and(|c| !c.trim().is_empty());
    if matches!(to, DocumentStatus::Rejected | DocumentStatus::Flagged) && !has_comments {
        return Err(AppError::Validation(format!(
            "Moving a document to {} requires reviewer comments",
            to.as_str()
        )));
    }

    Ok(())
}

/// Execute a full status transition: load, validate, apply with audit.
pub async fn transition(
    store: &dyn Store,
    document_id: Uuid,
    request: &TransitionRequest,
    actor: TransitionActor,
) -> Result<TransitionResult, AppError> {
    let document = store
        .find_document(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    // foreign documents look missing, whatever the requested edge
    if actor.role == AppRole::Institution
        && owned_institution(store, actor.id).await? != document.institution_id
    {
        return Err(AppError::NotFound("Document not found".to_string()));
    }

    validate_transition(
        document.status,
        request.new_status,
        actor.role,
        request.comments.as_deref(),
    )?;

    let change = StatusChange {
        document_id,
        previous_status: document.status,
        new_status: request.new_status,
        actor_id: actor.id,
        review: is_review_decision(request.new_status),
        comments: request
            .comments
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };
    let updated = store.apply_status_change(&change).await?;

    tracing::info!(
        document_id = %document_id,
        actor_id = %actor.id,
        from = change.previous_status.as_str(),
        to = change.new_status.as_str(),
        "Document status changed"
    );

    Ok(TransitionResult {
        document_id,
        previous_status: change.previous_status,
        new_status: change.new_status,
        document: updated,
    })
}
