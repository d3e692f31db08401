use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod queue;

use config::Config;
use queue::{MockQueue, appointment_id_for};

const CONFIG_PATH: &str = "mock-server.toml";

#[derive(Clone)]
struct AppState {
    queue: Arc<RwLock<MockQueue>>,
    doctor_id: Arc<str>,
}

fn not_found(message: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "message": message })))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn patient_queue(State(state): State<AppState>, Path(appointment_id): Path<String>) -> Response {
    match state.queue.read().await.patient_status(&appointment_id) {
        Some(payload) => Json(payload).into_response(),
        None => not_found(format!("Appointment {} not found", appointment_id)).into_response(),
    }
}

async fn doctor_queue(State(state): State<AppState>, Path(doctor_id): Path<String>) -> Response {
    if doctor_id != *state.doctor_id {
        return not_found(format!("Doctor {} not found", doctor_id)).into_response();
    }
    Json(state.queue.read().await.doctor_queue()).into_response()
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/queue/patient/{appointment_id}", get(patient_queue))
        .route("/api/queue/doctor/{doctor_id}", get(doctor_queue))
        .with_state(state)
}

/// Call the next patient in every `interval`
fn start_advance_task(queue: Arc<RwLock<MockQueue>>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let mut queue = queue.write().await;
            if let Some(token) = queue.advance() {
                info!(
                    "Served {}, now serving {} ({} in queue)",
                    token,
                    queue.current_token().unwrap_or("-"),
                    queue.len()
                );
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = Config::load(CONFIG_PATH)?;
    info!("Loaded configuration: {:?}", config);

    let queue = Arc::new(RwLock::new(MockQueue::new(config.minutes_per_patient)));

    let _advance = start_advance_task(queue.clone(), Duration::from_secs(config.advance_interval_secs));

    let app = router(AppState {
        queue,
        doctor_id: Arc::from(config.doctor_id.as_str()),
    })
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from((config.bind_host(), config.port));
    info!("Starting mock queue backend on http://{}", addr);
    info!("Patient queue: http://{}/api/queue/patient/{}", addr, appointment_id_for("T045"));
    info!(
        "Doctor queue: http://{}/api/queue/doctor/{}",
        addr, config.doctor_id
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
