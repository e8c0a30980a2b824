use axum::{Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{ActionResponse, AuthResponse, GoogleAuthRequest},
    session::Session,
};

pub async fn google_auth(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<ActionResponse<AuthResponse>>> {
    let session = Session::new();
    let auth = state
        .auth_service()
        .google(
            &session,
            payload.id_token.as_deref(),
            payload.error_code.as_deref(),
        )
        .await?;

    Ok(Json(ActionResponse::ok(auth)))
}
