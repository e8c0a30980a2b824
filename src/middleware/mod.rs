use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    models::Role,
    queries::user_queries,
    session::Session,
    utils::jwt,
};

fn bearer_session(state: &AppState, req: &Request) -> Result<Session, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    let claims = jwt::verify_token(&state.auth, token)?;

    Ok(Session::restore(claims.into_session_user()))
}

/// Rebuilds the caller's `Session` from the bearer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = bearer_session(&state, &req)?;
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

/// Admin rights come from the stored profile, not the token, so a demoted
/// or removed admin loses access before their token expires.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims_user = bearer_session(&state, &req)?
        .current()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let profile = user_queries::find_by_id(state.store.as_ref(), &claims_user.uid).await?;
    let Some(profile) = profile.filter(|p| p.role == Role::Admin) else {
        tracing::warn!("Admin access refused for {}", claims_user.uid);
        return Err(AppError::Forbidden("Admin access required".to_string()));
    };

    let mut user = claims_user;
    user.role = profile.role;
    req.extensions_mut().insert(Session::restore(user));

    Ok(next.run(req).await)
}
