use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{ActionResponse, DeleteAccountRequest, ProfileResponse},
    session::Session,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ActionResponse<ProfileResponse>>> {
    let profile = state.auth_service().current_user(&session).await?;

    Ok(Json(ActionResponse::ok(profile)))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Option<Json<DeleteAccountRequest>>,
) -> Result<Json<ActionResponse<()>>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    state
        .auth_service()
        .delete_own_account(&session, payload.password.as_deref())
        .await?;

    Ok(Json(ActionResponse::done()))
}
