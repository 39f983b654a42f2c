use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::overpass::OverpassClient;
use crate::search::{GeoSearch, SearchError};
use crate::tools::{self, ToolCall, ToolSpec};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
    kind: &'static str,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> ApiError {
    ApiError {
        status,
        body: ApiErrorBody {
            error: msg.into(),
            kind,
            code: status.as_u16(),
            candidates: None,
        },
    }
}

pub(super) fn status_for(e: &SearchError) -> StatusCode {
    match e {
        SearchError::Ambiguous { .. } => StatusCode::MULTIPLE_CHOICES,
        SearchError::RegionNotFound(_) | SearchError::LandmarkNotFound(_) => StatusCode::NOT_FOUND,
        SearchError::CoordinatesUndetermined(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SearchError::Network { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        let mut err = api_error(status_for(&e), e.kind(), e.to_string());
        if let SearchError::Ambiguous { candidates, .. } = e {
            err.body.candidates = Some(candidates.into_iter().collect());
        }
        err
    }
}

/// Run a pipeline call on the blocking pool while holding the search lock.
async fn run_blocking<R, F>(state: Arc<AppState>, f: F) -> Result<R, ApiError>
where
    F: FnOnce(&GeoSearch<OverpassClient>) -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let search = state.lock();
        f(&search)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", format!("search worker failed: {}", e)))
}

fn required(value: Option<String>, param: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(api_error(
            StatusCode::BAD_REQUEST,
            "bad_request",
            format!("Missing '{}' parameter", param),
        )),
    }
}

// ─── GET /api/tools ──────────────────────────────────────────────

pub async fn tool_list() -> Json<Vec<ToolSpec>> {
    Json(tools::tool_specs())
}

// ─── POST /api/tools/call ────────────────────────────────────────

#[derive(Serialize)]
pub struct ToolCallResponse {
    pub name: &'static str,
    pub output: String,
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<ToolCallResponse>, ApiError> {
    let start = Instant::now();
    let call = ToolCall::from_value(body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "bad_request", format!("Invalid tool call: {}", e)))?;

    let name = call.name();
    let output = run_blocking(state, move |search| search.dispatch(&call)).await?;

    info!(tool = name, elapsed_ms = start.elapsed().as_millis() as u64, "POST /api/tools/call");
    Ok(Json(ToolCallResponse { name, output }))
}

// ─── GET /api/city ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CityQuery {
    pub name: Option<String>,
    pub amenity: Option<String>,
}

pub async fn city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = Instant::now();
    let name = required(params.name, "name")?;
    let amenity = params.amenity;

    let log_name = name.clone();
    let report = run_blocking(state, move |search| search.search_city(&name, amenity.as_deref())).await??;

    info!(
        city = %log_name,
        results = report.results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "GET /api/city"
    );
    Ok(Json(report))
}

// ─── GET /api/poi ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PoiQuery {
    pub name: Option<String>,
    pub amenity: Option<String>,
    pub radius: Option<u32>,
}

pub async fn poi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PoiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = Instant::now();
    let name = required(params.name, "name")?;
    let amenity = required(params.amenity, "amenity")?;
    if params.radius == Some(0) {
        return Err(api_error(StatusCode::BAD_REQUEST, "bad_request", "Radius must be positive"));
    }

    let log_name = name.clone();
    let report = run_blocking(state, move |search| {
        let radius = params.radius.unwrap_or(search.config().radius_m);
        search.search_near_point_within(&name, &amenity, radius)
    })
    .await??;

    info!(
        poi = %log_name,
        results = report.results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "GET /api/poi"
    );
    Ok(Json(report))
}
