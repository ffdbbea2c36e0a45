use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use anyhow::Context;
use anyhow::Error as AnyhowError;

use models::appointment::NewAppointment;
use models::doctor::NewDoctor;
use models::errors::StoreError;
use models::patient::{NewPatient, PatientUpdate};
use store::RecordStore;

pub mod config;
pub use crate::config::{load_rest_api_config, RestApiConfig};

pub const SERVICE_NAME: &str = "HealthFlow TeleAtendimento API";

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            RestApiError::Store(StoreError::NotFound(..)) => StatusCode::NOT_FOUND,
            RestApiError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            RestApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// Shared state for the Axum application; every request goes through the one
// store mutex, which serializes identifier assignment and collection edits.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<RecordStore>>,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdateRequest {
    status: String,
}

fn success(data: impl serde::Serialize) -> Json<Value> {
    Json(json!({ "status": "success", "data": data }))
}

fn created(location: String, data: impl serde::Serialize) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "status": "success", "data": data })),
    )
        .into_response()
}

// ---- Patient handlers ----

async fn list_patients_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().await;
    success(store.list_patients())
}

async fn get_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, RestApiError> {
    let store = state.store.lock().await;
    let patient = store.get_patient(id)?;
    Ok(success(patient))
}

async fn create_patient_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewPatient>,
) -> Response {
    let mut store = state.store.lock().await;
    let patient = store.create_patient(payload);
    created(format!("/api/v1/patients/{}", patient.id), patient)
}

async fn update_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PatientUpdate>,
) -> Result<Json<Value>, RestApiError> {
    let mut store = state.store.lock().await;
    let patient = store.update_patient(id, payload)?;
    Ok(success(patient))
}

async fn delete_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, RestApiError> {
    let mut store = state.store.lock().await;
    store.delete_patient(id)?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Patient {} removed.", id),
    })))
}

// ---- Doctor handlers ----

async fn list_doctors_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().await;
    success(store.list_doctors())
}

async fn get_doctor_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, RestApiError> {
    let store = state.store.lock().await;
    let doctor = store.get_doctor(id)?;
    Ok(success(doctor))
}

async fn create_doctor_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewDoctor>,
) -> Response {
    let mut store = state.store.lock().await;
    let doctor = store.create_doctor(payload);
    created(format!("/api/v1/doctors/{}", doctor.id), doctor)
}

// ---- Appointment handlers ----

async fn list_appointments_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().await;
    success(store.list_appointments())
}

async fn get_appointment_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, RestApiError> {
    let store = state.store.lock().await;
    let appointment = store.get_appointment(id)?;
    Ok(success(appointment))
}

async fn create_appointment_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewAppointment>,
) -> Result<Response, RestApiError> {
    let mut store = state.store.lock().await;
    let appointment = store.create_appointment(payload)?;
    Ok(created(
        format!("/api/v1/appointments/{}", appointment.id),
        appointment,
    ))
}

async fn update_appointment_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, RestApiError> {
    let mut store = state.store.lock().await;
    let appointment = store.transition_appointment_status(id, &payload.status)?;
    Ok(success(appointment))
}

// ---- Dashboard and health ----

async fn statistics_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().await;
    success(store.statistics())
}

async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": Utc::now(),
            "service": SERVICE_NAME,
        })),
    )
}

/// Builds the full application router over the given store.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route(
            "/api/v1/patients",
            get(list_patients_handler).post(create_patient_handler),
        )
        .route(
            "/api/v1/patients/:id",
            get(get_patient_handler)
                .put(update_patient_handler)
                .delete(delete_patient_handler),
        )
        .route(
            "/api/v1/doctors",
            get(list_doctors_handler).post(create_doctor_handler),
        )
        .route("/api/v1/doctors/:id", get(get_doctor_handler))
        .route(
            "/api/v1/appointments",
            get(list_appointments_handler).post(create_appointment_handler),
        )
        .route("/api/v1/appointments/:id", get(get_appointment_handler))
        .route(
            "/api/v1/appointments/:id/status",
            patch(update_appointment_status_handler),
        )
        .route("/api/v1/dashboard/statistics", get(statistics_handler))
        .route("/api/v1/health", get(health_check_handler))
        .with_state(state)
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(
    config: &RestApiConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), AnyhowError> {
    let store = if config.seed_demo_data {
        RecordStore::with_seed_data()
    } else {
        RecordStore::new()
    };
    let app = app_router(AppState::new(store));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid REST API host/port")?;
    info!("REST API server listening on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal.");
        })
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped.");
    Ok(())
}
