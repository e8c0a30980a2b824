use serde::Serialize;

use crate::{
    error::{AppError, Result},
    models::{DeleteTarget, NewUser, StoreTimestamp, USERS, User, UserRequest},
    services::page_cache::{ADMIN_USERS, PageCache},
    store::DocumentStore,
};

/// Outcome of an administrative deletion. Only the profile record is removed;
/// the identity account (if any) keeps existing and can still sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminDeletion {
    pub user_id: String,
    pub identity_account_retained: bool,
}

pub async fn list_users(store: &dyn DocumentStore) -> Result<Vec<User>> {
    let docs = store
        .list(USERS)
        .await
        .map_err(|e| AppError::store("Failed to fetch users", e))?;

    Ok(docs.iter().map(User::from_document).collect())
}

pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<User>> {
    let doc = store
        .get(USERS, id)
        .await
        .map_err(|e| AppError::store("Failed to fetch user", e))?;

    Ok(doc.as_ref().map(User::from_document))
}

pub async fn get_user(store: &dyn DocumentStore, id: &str) -> Result<User> {
    find_by_id(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Profile created from the admin panel; the store assigns the id.
pub async fn create_user(
    store: &dyn DocumentStore,
    pages: &PageCache,
    user: &NewUser,
) -> Result<User> {
    let id = store
        .insert(USERS, user.to_fields(StoreTimestamp::now()))
        .await
        .map_err(|e| AppError::store("Failed to create user", e))?;

    pages.invalidate(ADMIN_USERS);

    get_user(store, &id).await
}

/// Profile mirroring an identity account; the record id is the account uid.
pub async fn create_user_with_id(
    store: &dyn DocumentStore,
    pages: &PageCache,
    id: &str,
    user: &NewUser,
) -> Result<User> {
    store
        .set(USERS, id, user.to_fields(StoreTimestamp::now()))
        .await
        .map_err(|e| AppError::store("Failed to create user", e))?;

    pages.invalidate(ADMIN_USERS);

    get_user(store, id).await
}

pub async fn update_user(
    store: &dyn DocumentStore,
    pages: &PageCache,
    id: &str,
    req: &UserRequest,
) -> Result<User> {
    if find_by_id(store, id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    store
        .merge(USERS, id, req.to_fields(StoreTimestamp::now()))
        .await
        .map_err(|e| AppError::store("Failed to update user", e))?;

    pages.invalidate(ADMIN_USERS);

    get_user(store, id).await
}

pub async fn delete_user_record(store: &dyn DocumentStore, id: &str) -> Result<()> {
    store
        .delete(USERS, id)
        .await
        .map_err(|e| AppError::store("Failed to delete user", e))
}

/// Admin-panel deletion: removes the profile record and nothing else.
pub async fn delete_user(
    store: &dyn DocumentStore,
    pages: &PageCache,
    target: &DeleteTarget,
) -> Result<AdminDeletion> {
    let id = target
        .resolve_id()
        .ok_or_else(|| AppError::BadRequest("No user ID provided".to_string()))?;

    if find_by_id(store, id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    delete_user_record(store, id).await?;

    tracing::warn!(
        "Deleted profile {} from the admin panel; its identity account is retained",
        id
    );

    pages.invalidate(ADMIN_USERS);

    Ok(AdminDeletion {
        user_id: id.to_string(),
        identity_account_retained: true,
    })
}
