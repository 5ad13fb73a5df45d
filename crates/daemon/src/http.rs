use crate::auth::{require_api_key, ApiKeys};
use crate::error::ApiError;
use crate::registry::Registry;
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use common::{
    HealthResponse, MachineStatus, MessageResponse, ServiceInfo, SetStatusRequest, StatusMap,
    StatusResponse,
};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const SERVICE_NAME: &str = "statusd";

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub api_keys: ApiKeys,
}

impl AppState {
    pub fn new(registry: Registry, api_keys: ApiKeys) -> Self {
        Self { registry, api_keys }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Auth runs as a route layer so it rejects before the body is even parsed.
    let protected = Router::new()
        .route("/status", get(list_statuses).post(set_status))
        .route("/status/{machine_id}", get(get_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        status: "ok".to_string(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn set_status(
    State(state): State<AppState>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Ok(status) = payload.status.parse::<MachineStatus>() else {
        return Err(ApiError::InvalidStatus);
    };
    let machine_id = payload.machine_id;
    if machine_id.is_empty() {
        return Err(ApiError::InvalidMachineId);
    }

    let entry = state.registry.set(&machine_id, status, payload.timestamp);
    tracing::debug!(
        machine_id = %machine_id,
        status = %entry.status,
        timestamp = entry.timestamp,
        "status updated"
    );

    Ok(Json(MessageResponse {
        message: "Status updated".to_string(),
    }))
}

async fn get_status(
    State(state): State<AppState>,
    Path(machine_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let entry = state.registry.get(&machine_id).ok_or(ApiError::NotFound)?;
    Ok(Json(StatusResponse {
        device_id: machine_id,
        status: entry.status,
        timestamp: entry.timestamp,
    }))
}

async fn list_statuses(State(state): State<AppState>) -> Json<StatusMap> {
    Json(state.registry.snapshot())
}
