//! Request handlers for the router's HTTP surface.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RouterError;
use crate::executor::{ExecOutcome, ExecRequest};
use crate::fallback::{FallbackEvent, FallbackSource, Resolution};
use crate::health::{now_millis, MonitorSnapshot};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::registry::{Backend, BackendSnapshot};

/// One backend in the health listing.
#[derive(Debug, Serialize)]
pub struct HealthView {
    #[serde(flatten)]
    pub backend: BackendSnapshot,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthOverview {
    pub models: Vec<HealthView>,
    pub monitor: MonitorSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ProbeResults {
    pub results: Vec<HealthView>,
}

#[derive(Debug, Serialize)]
pub struct FallbackEvents {
    pub events: Vec<FallbackEvent>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub provider: String,
    pub model: String,
}

/// Body shared by `/resolve` and `/interviews/start`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub simulation_id: Option<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub fallbacks: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub simulation_id: String,
    pub primary: String,
    #[serde(flatten)]
    pub resolution: Resolution,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewResponse {
    pub simulation_id: String,
    pub primary: String,
    pub chosen: String,
    pub used_fallback: bool,
    pub fallback_source: FallbackSource,
    pub agent: ExecOutcome,
}

fn view(state: &AppState, snapshot: BackendSnapshot, now: u64) -> HealthView {
    let healthy = state.policy.is_healthy(&snapshot.health, now);
    HealthView {
        backend: snapshot,
        healthy,
    }
}

fn view_of(state: &AppState, backend: &Backend) -> HealthView {
    view(state, backend.snapshot(), now_millis())
}

/// Parse a JSON body leniently: an empty body is an empty object.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|e| RouterError::InvalidRequest(format!("invalid JSON body: {}", e)).into())
}

/// Validated routing request.
struct Routing {
    simulation_id: String,
    primary: String,
    fallbacks: Vec<String>,
}

fn routing_request(body: &Value) -> Result<Routing, ApiError> {
    let request: RouteRequest = serde_json::from_value(body.clone())
        .map_err(|e| RouterError::InvalidRequest(format!("invalid request: {}", e)))?;

    match (request.simulation_id, request.primary) {
        (Some(simulation_id), Some(primary)) if !simulation_id.is_empty() && !primary.is_empty() => {
            Ok(Routing {
                simulation_id,
                primary,
                fallbacks: request.fallbacks.unwrap_or_default(),
            })
        }
        _ => Err(RouterError::InvalidRequest("simulationId and primary are required".into()).into()),
    }
}

pub async fn root() -> &'static str {
    "ok"
}

pub async fn list_health(State(state): State<AppState>) -> Json<HealthOverview> {
    let now = now_millis();
    let models = state
        .registry
        .all_backends()
        .iter()
        .map(|b| view(&state, b.snapshot(), now))
        .collect();

    Json(HealthOverview {
        models,
        monitor: state.monitor.status(),
    })
}

pub async fn get_health(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HealthView>, ApiError> {
    let backend = state.registry.get(&key)?;
    Ok(Json(view_of(&state, &backend)))
}

pub async fn probe_all(State(state): State<AppState>) -> Json<ProbeResults> {
    tracing::info!("Manual probe of all backends requested");
    let outcomes = state.monitor.probe_all().await;
    let now = now_millis();
    Json(ProbeResults {
        results: outcomes.into_iter().map(|o| view(&state, o, now)).collect(),
    })
}

pub async fn probe_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HealthView>, ApiError> {
    let snapshot = state.monitor.probe_one(&key).await?;
    Ok(Json(view(&state, snapshot, now_millis())))
}

pub async fn register_backend(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<HealthView>), ApiError> {
    if request.provider.trim().is_empty() || request.model.trim().is_empty() {
        return Err(RouterError::InvalidRequest("provider and model are required".into()).into());
    }
    let backend = state.registry.register(&request.provider, &request.model)?;
    Ok((StatusCode::CREATED, Json(view_of(&state, &backend))))
}

pub async fn resolve(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResolveResponse>, ApiError> {
    let routing = routing_request(&parse_body(&body)?)?;
    let resolution =
        state
            .selector
            .resolve(&routing.simulation_id, &routing.primary, &routing.fallbacks)?;

    Ok(Json(ResolveResponse {
        simulation_id: routing.simulation_id,
        primary: routing.primary,
        resolution,
    }))
}

pub async fn start_interview(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InterviewResponse>, ApiError> {
    let payload = parse_body(&body)?;
    let routing = routing_request(&payload)?;

    let resolution =
        state
            .selector
            .resolve(&routing.simulation_id, &routing.primary, &routing.fallbacks)?;
    let backend = state.registry.get(&resolution.chosen)?;

    tracing::info!(
        simulation_id = %routing.simulation_id,
        chosen = %resolution.chosen,
        used_fallback = resolution.used_fallback,
        "Starting interview"
    );

    let request = ExecRequest::interview(
        backend.provider(),
        backend.model(),
        &state.interview_prompt,
        payload,
    );
    let agent = state.executor.execute(request).await?;

    Ok(Json(InterviewResponse {
        simulation_id: routing.simulation_id,
        primary: routing.primary,
        chosen: resolution.chosen,
        used_fallback: resolution.used_fallback,
        fallback_source: resolution.fallback_source,
        agent,
    }))
}

pub async fn list_fallbacks(State(state): State<AppState>) -> Json<FallbackEvents> {
    Json(FallbackEvents {
        events: state.selector.log().list(),
    })
}

pub async fn clear_fallbacks(State(state): State<AppState>) -> Json<Value> {
    let log = state.selector.log();
    let removed = log.clear();
    tracing::info!(removed, "Fallback events cleared");
    Json(json!({
        "ok": true,
        "cleared": true,
        "removed": removed,
        "remaining": log.len(),
    }))
}
