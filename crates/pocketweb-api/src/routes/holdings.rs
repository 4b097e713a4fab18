//! Holding endpoints: CRUD plus portfolio upload

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pocketweb_core::{IngestionReport, MappingMode, MappingPreview, NewHolding, SchemaKind};

use super::{read_preview_file, read_upload_form, ScopeQuery};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateHoldingRequest {
    pub value: f64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let holdings = state.books.holdings(&scope).await?;
    Ok(Json(json!({"success": true, "holdings": holdings})))
}

pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
    Json(new): Json<NewHolding>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let holding = state.books.add_holding(&scope, new).await?;
    Ok(Json(json!({"success": true, "holding": holding})))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
    Json(req): Json<UpdateHoldingRequest>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let holding = state
        .books
        .update_holding_value(&scope, &id, req.value)
        .await?;
    Ok(Json(json!({"success": true, "holding": holding})))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    state.books.delete_holding(&scope, &id).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IngestionReport>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let mode = form
        .mapping
        .map(MappingMode::Manual)
        .unwrap_or(MappingMode::Auto);
    let report = state
        .books
        .ingest(&form.text, SchemaKind::Holding, mode, &form.scope)
        .await?;
    Ok(Json(report))
}

pub async fn preview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MappingPreview>, ApiError> {
    let text = read_preview_file(multipart).await?;
    let preview = state.books.preview(&text, SchemaKind::Holding)?;
    Ok(Json(preview))
}
