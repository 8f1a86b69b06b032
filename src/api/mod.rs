use axum::Json;
use axum::extract::Path;
use axum::routing::{delete, patch};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use tracing::info;

use crate::error::AppError;
use crate::models::*;
use crate::services::AgendaStore;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/summary", get(summary))
        .route("/appointments/{id}", delete(delete_appointment))
        .route("/appointments/{id}/toggle", patch(toggle_appointment))
        .with_state(state)
}

fn ensure_ready(store: &AgendaStore) -> Result<(), AppError> {
    if store.is_ready() {
        Ok(())
    } else {
        Err(AppError::Loading)
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let store = state.store.lock().await;
    ensure_ready(&store)?;
    Ok(StatusCode::OK)
}

async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let store = state.store.lock().await;
    ensure_ready(&store)?;
    Ok(Json(store.ordered_view()))
}

async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<NewAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let mut store = state.store.lock().await;
    ensure_ready(&store)?;

    let now = Utc::now().timestamp_millis();
    let accepted = state
        .policy
        .validate(&req.title, req.appointment_date, now)
        .inspect_err(|e| info!("rejected appointment: {}", e))?;

    let appointment = store.create_at(accepted.title, accepted.appointment_date, now);
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn toggle_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, AppError> {
    let mut store = state.store.lock().await;
    ensure_ready(&store)?;
    let appointment = store.toggle(id).ok_or(AppError::NotFound)?;
    Ok(Json(appointment))
}

async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    ensure_ready(&store)?;
    match store.remove(id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound),
    }
}

async fn summary(State(state): State<AppState>) -> Result<Json<AgendaSummary>, AppError> {
    let store = state.store.lock().await;
    ensure_ready(&store)?;
    Ok(Json(store.summary()))
}
