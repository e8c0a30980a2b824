use axum::{Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{ActionResponse, AuthResponse, LoginRequest},
    session::Session,
};

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ActionResponse<AuthResponse>>> {
    let session = Session::new();
    let auth = state
        .auth_service()
        .login(&session, &payload.email, &payload.password)
        .await?;

    Ok(Json(ActionResponse::ok(auth)))
}
