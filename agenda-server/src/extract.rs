//! Request extractors.

use agenda_core::{AgendaError, Session};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::routes::AppError;
use crate::state::AppState;

/// Session for the caller, resolved from an `Authorization: Bearer` header.
///
/// A request without the header gets an anonymous session; operations that
/// need an identity then fail with 401. A header carrying an unknown token is
/// rejected outright.
pub struct RequestSession {
    pub session: Session,
    pub token: Option<String>,
}

impl FromRequestParts<AppState> for RequestSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(RequestSession {
                session: Session::anonymous(),
                token: None,
            });
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AgendaError::NotAuthenticated)?;

        let Some(identity) = state.tokens().resolve(token).await else {
            tracing::warn!(uri = %parts.uri, "rejected unknown bearer token");
            return Err(AgendaError::NotAuthenticated.into());
        };

        Ok(RequestSession {
            session: Session::authenticated(identity),
            token: Some(token.to_string()),
        })
    }
}

/// JSON request body whose rejections (malformed JSON, wrong field types,
/// missing content type) come back as 400 with an `{ "error": ... }` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
