pub mod appointments;
pub mod auth;
pub mod profile;

use agenda_core::AgendaError;
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Every route, with CORS and request tracing applied.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(auth::router())
        .merge(appointments::router())
        .merge(profile::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        AppError {
            status,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

fn status_for(err: &anyhow::Error) -> StatusCode {
    if err.is::<JsonRejection>() {
        return StatusCode::BAD_REQUEST;
    }
    match err.downcast_ref::<AgendaError>() {
        Some(AgendaError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(AgendaError::NotAuthenticated | AgendaError::InvalidCredentials) => {
            StatusCode::UNAUTHORIZED
        }
        Some(AgendaError::AccessDenied(_)) => StatusCode::FORBIDDEN,
        Some(AgendaError::AppointmentNotFound(_) | AgendaError::ProfileNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        Some(AgendaError::EmailTaken(_)) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.error.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        AppError {
            status: status_for(&error),
            error,
        }
    }
}
