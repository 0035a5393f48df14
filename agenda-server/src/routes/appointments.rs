//! Appointment endpoints

use std::convert::Infallible;

use agenda_core::{AgendaError, Appointment, AppointmentDraft, AppointmentPatch};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;

use crate::extract::{ApiJson, RequestSession};
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/live", get(live_appointments))
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
}

/// GET /appointments - List the caller's appointments
async fn list_appointments(
    State(state): State<AppState>,
    caller: RequestSession,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.backend().appointments(&caller.session).list().await?;
    Ok(Json(appointments))
}

/// POST /appointments - Book a new appointment
async fn create_appointment(
    State(state): State<AppState>,
    caller: RequestSession,
    ApiJson(draft): ApiJson<AppointmentDraft>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let gateway = state.backend().appointments(&caller.session);

    let draft = AppointmentDraft {
        date: draft.date.trim().replace('/', "-"),
        ..draft
    };
    let id = gateway.create(&draft).await?;
    let appointment = gateway
        .get(&id)
        .await?
        .ok_or(AgendaError::AppointmentNotFound(id))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /appointments/:id - Fetch one appointment
async fn get_appointment(
    State(state): State<AppState>,
    caller: RequestSession,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state
        .backend()
        .appointments(&caller.session)
        .get(&id)
        .await?
        .ok_or(AgendaError::AppointmentNotFound(id))?;

    Ok(Json(appointment))
}

/// PATCH /appointments/:id - Change some fields of an appointment
async fn update_appointment(
    State(state): State<AppState>,
    caller: RequestSession,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AppointmentPatch>,
) -> Result<Json<Appointment>, AppError> {
    let gateway = state.backend().appointments(&caller.session);

    gateway.update(&id, &patch).await?;
    let appointment = gateway
        .get(&id)
        .await?
        .ok_or(AgendaError::AppointmentNotFound(id))?;

    Ok(Json(appointment))
}

/// DELETE /appointments/:id - Remove an appointment (unknown ids succeed)
async fn delete_appointment(
    State(state): State<AppState>,
    caller: RequestSession,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .backend()
        .appointments(&caller.session)
        .delete(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /appointments/live - Stream the caller's list on every change
///
/// Each `snapshot` event carries the full list as JSON. The stream ends
/// when the client disconnects.
async fn live_appointments(
    State(state): State<AppState>,
    caller: RequestSession,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let live = state.backend().appointments(&caller.session).subscribe()?;

    let stream = futures::stream::unfold(live, |mut live| async move {
        let event = match live.next().await? {
            Ok(appointments) => Event::default()
                .event("snapshot")
                .json_data(&appointments)
                .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
            Err(e) => Event::default().event("error").data(e.to_string()),
        };
        Some((Ok(event), live))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
