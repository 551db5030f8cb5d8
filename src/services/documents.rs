//! Document registration and role-scoped document access.

use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::document::{CreateDocument, Document, DocumentFilters, NewDocument};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::AppRole;
use crate::store::Store;

/// The single institution owned by an institution user.
///
/// Owning none is `NotFound`, owning several is a `Conflict`.
pub(crate) async fn owned_institution(store: &dyn Store, user_id: Uuid) -> Result<Uuid, AppError> {
    let owned = store.find_owned_institution_ids(user_id).await?;
    match owned.as_slice() {
        [] => Err(AppError::NotFound(
            "No institution is registered for this user".to_string(),
        )),
        [id] => Ok(*id),
        _ => Err(AppError::Conflict(
            "User owns more than one institution".to_string(),
        )),
    }
}

/// Record metadata for a file the institution uploaded to external storage.
pub async fn register(
    store: &dyn Store,
    user_id: Uuid,
    role: AppRole,
    input: &CreateDocument,
) -> Result<Document, AppError> {
    if role != AppRole::Institution {
        return Err(AppError::Forbidden(
            "Only institution accounts can upload documents".to_string(),
        ));
    }
    input.validate()?;

    let institution_id = owned_institution(store, user_id).await?;
    let document = store
        .insert_document(&NewDocument {
            institution_id,
            uploaded_by: user_id,
            document_type: input.document_type,
            file_name: input.file_name.trim().to_string(),
            file_path: input.file_path.trim().to_string(),
            file_size: input.file_size,
        })
        .await?;

    tracing::info!(
        document_id = %document.id,
        institution_id = %institution_id,
        document_type = ?document.document_type,
        "Document registered"
    );
    Ok(document)
}

/// List documents visible to the caller.
///
/// Institution users are pinned to their own institution whatever filter
/// they pass; public users cannot list documents.
pub async fn list(
    store: &dyn Store,
    user_id: Uuid,
    role: AppRole,
    filters: &DocumentFilters,
    pagination: &Pagination,
) -> Result<PagedResult<Document>, AppError> {
    let scoped = match role {
        AppRole::Reviewer | AppRole::Admin => filters.clone(),
        AppRole::Institution => {
            let own = owned_institution(store, user_id).await?;
            if filters.institution_id.is_some_and(|id| id != own) {
                return Err(AppError::Forbidden(
                    "Documents of other institutions are not visible".to_string(),
                ));
            }
            DocumentFilters {
                institution_id: Some(own),
                ..filters.clone()
            }
        }
        AppRole::Public => {
            return Err(AppError::Forbidden(
                "Public accounts cannot browse documents".to_string(),
            ))
        }
    };

    store.list_documents(&scoped, pagination).await
}

/// Fetch one document if the caller may see it.
pub async fn get(
    store: &dyn Store,
    user_id: Uuid,
    role: AppRole,
    document_id: Uuid,
) -> Result<Document, AppError> {
    let document = store
        .find_document(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    match role {
        AppRole::Reviewer | AppRole::Admin => Ok(document),
        AppRole::Institution => {
            if owned_institution(store, user_id).await? == document.institution_id {
                Ok(document)
            } else {
                // indistinguishable from a missing document for outsiders
                Err(AppError::NotFound("Document not found".to_string()))
            }
        }
        AppRole::Public => Err(AppError::Forbidden(
            "Public accounts cannot view documents".to_string(),
        )),
    }
}
