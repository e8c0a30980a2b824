use axum::{Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{ActionResponse, AuthResponse, RegisterRequest},
    session::Session,
};

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ActionResponse<AuthResponse>>> {
    let session = Session::new();
    let auth = state
        .auth_service()
        .register(&session, payload.name.trim(), &payload.email, &payload.password)
        .await?;

    Ok(Json(ActionResponse::ok(auth)))
}
