//! Authentication endpoints

use agenda_core::{Identity, NewUser, Session};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::extract::{ApiJson, RequestSession};
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from a successful sign-in or registration
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
}

async fn issue(state: &AppState, identity: Identity) -> AuthResponse {
    let token = state.tokens().issue(identity.clone()).await;
    AuthResponse {
        token,
        uid: identity.uid,
        email: identity.email,
    }
}

/// POST /auth/register - Create an account and sign in
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = Session::anonymous();
    let new_user = NewUser {
        name: request.name,
        email: request.email,
        phone: request.phone,
        city: request.city,
    };

    state
        .backend()
        .auth(&session)
        .register(new_user, &request.password)
        .await?;
    let identity = session.require()?;

    Ok((StatusCode::CREATED, Json(issue(&state, identity).await)))
}

/// POST /auth/login - Exchange credentials for a bearer token
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = Session::anonymous();
    let identity = state
        .backend()
        .auth(&session)
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(issue(&state, identity).await))
}

/// POST /auth/logout - Revoke the caller's token
async fn logout(
    State(state): State<AppState>,
    caller: RequestSession,
) -> Result<StatusCode, AppError> {
    let Some(token) = caller.token else {
        return Ok(StatusCode::NO_CONTENT);
    };

    state.tokens().revoke(&token).await;
    state.backend().auth(&caller.session).sign_out();
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{register, send, test_app};
    use serde_json::json;

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = test_app();
        register(&app, "Ana").await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"name": "Ana", "email": "ANA@agenda.test", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn short_password_is_a_bad_request() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"name": "Ana", "email": "ana@agenda.test", "password": "123"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn login_then_logout_revokes_token() {
        let app = test_app();
        register(&app, "Ana").await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "ana@agenda.test", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "ana@agenda.test", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
