use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use serde_json::{Value, json};
use std::sync::MutexGuard;
use uuid::Uuid;

use super::AppState;
use super::errors::{AppError, JsonBody};
use crate::db::Database;
use crate::models::{Flow, FlowCreate, FlowListCreate, FlowUpdate};
use crate::transfer::{self, ExportFile};

type ApiResult<T> = Result<T, AppError>;

fn lock(state: &AppState) -> ApiResult<MutexGuard<'_, Database>> {
    state
        .db
        .lock()
        .map_err(|e| AppError::Internal(format!("database lock poisoned: {e}")))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::Validation(format!("invalid flow id {raw:?}: {e}")))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_flow(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<FlowCreate>,
) -> ApiResult<Json<Flow>> {
    let flow = lock(&state)?.insert_flow(input)?;
    Ok(Json(flow))
}

pub async fn list_flows(State(state): State<AppState>) -> ApiResult<Json<Vec<Flow>>> {
    let flows = lock(&state)?.list_flows()?;
    Ok(Json(flows))
}

pub async fn get_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
) -> ApiResult<Json<Flow>> {
    let id = parse_id(&flow_id)?;
    let flow = lock(&state)?
        .get_flow(id)?
        .ok_or_else(|| AppError::NotFound("Flow not found".to_string()))?;
    Ok(Json(flow))
}

pub async fn update_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
    JsonBody(update): JsonBody<FlowUpdate>,
) -> ApiResult<Json<Flow>> {
    let id = parse_id(&flow_id)?;
    let flow = lock(&state)?.update_flow(id, &update)?;
    Ok(Json(flow))
}

pub async fn delete_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&flow_id)?;
    lock(&state)?.delete_flow(id)?;
    Ok(Json(json!({ "message": "Flow deleted successfully" })))
}

pub async fn create_flows(
    State(state): State<AppState>,
    JsonBody(list): JsonBody<FlowListCreate>,
) -> ApiResult<Json<Vec<Flow>>> {
    let flows = lock(&state)?.insert_flows(list.flows)?;
    Ok(Json(flows))
}

/// Import flows from the multipart field named `file`. Other fields are skipped.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Vec<Flow>>> {
    let mut multipart = multipart?;
    let mut contents = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            contents = Some(field.bytes().await?);
            break;
        }
    }

    let contents = contents
        .ok_or_else(|| AppError::Validation("missing multipart field \"file\"".to_string()))?;
    let list = transfer::parse_upload(&contents)?;
    let flows = lock(&state)?.insert_flows(list.flows)?;
    tracing::info!(count = flows.len(), "flows imported from upload");
    Ok(Json(flows))
}

pub async fn download_file(State(state): State<AppState>) -> ApiResult<Json<ExportFile>> {
    let flows = lock(&state)?.list_flows()?;
    Ok(Json(transfer::export_flows(&flows)?))
}
