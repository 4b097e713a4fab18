//! Transaction endpoints: CRUD plus statement upload

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use pocketweb_core::{
    IngestionReport, MappingMode, MappingPreview, NewTransaction, SchemaKind, TransactionPatch,
};

use super::{read_preview_file, read_upload_form, ScopeQuery};
use crate::error::ApiError;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let all = state.books.transactions(&scope).await?;
    let total = all.len();
    let page = query.page(all, state.books.config().pagination.records_per_page);
    Ok(Json(json!({
        "success": true,
        "total": total,
        "transactions": page,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
    Json(new): Json<NewTransaction>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let txn = state.books.add_transaction(&scope, new).await?;
    Ok(Json(json!({"success": true, "transaction": txn})))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let txn = state.books.update_transaction(&scope, &id, patch).await?;
    Ok(Json(json!({"success": true, "transaction": txn})))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    state.books.delete_transaction(&scope, &id).await?;
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
        .ingest(&form.text, SchemaKind::Transaction, mode, &form.scope)
        .await?;
    Ok(Json(report))
}

pub async fn preview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MappingPreview>, ApiError> {
    let text = read_preview_file(multipart).await?;
    let preview = state.books.preview(&text, SchemaKind::Transaction)?;
    Ok(Json(preview))
}
