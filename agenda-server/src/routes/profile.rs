//! Profile endpoints

use agenda_core::{User, UserPatch};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::extract::{ApiJson, RequestSession};
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(get_profile).patch(update_profile).delete(delete_account),
    )
}

/// GET /profile - The caller's profile
async fn get_profile(
    State(state): State<AppState>,
    caller: RequestSession,
) -> Result<Json<User>, AppError> {
    caller.session.require()?;

    let user = state
        .backend()
        .profiles(&caller.session)
        .current()
        .await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "No profile saved for this account"))?;

    Ok(Json(user))
}

/// PATCH /profile - Change name, phone or city
async fn update_profile(
    State(state): State<AppState>,
    caller: RequestSession,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<User>, AppError> {
    let user = state
        .backend()
        .profiles(&caller.session)
        .update(&patch)
        .await?;
    Ok(Json(user))
}

/// DELETE /profile - Delete the account with its profile and appointments
async fn delete_account(
    State(state): State<AppState>,
    caller: RequestSession,
) -> Result<StatusCode, AppError> {
    let identity = caller.session.require()?;

    state.backend().auth(&caller.session).delete_account().await?;
    state.tokens().revoke_user(&identity.uid).await;

    Ok(StatusCode::NO_CONTENT)
}
