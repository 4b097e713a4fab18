//! Savings pocket endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pocketweb_core::NewPocket;

use super::ScopeQuery;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    pub amount: f64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let pockets = state.books.pockets(&scope).await?;
    Ok(Json(json!({"success": true, "pockets": pockets})))
}

pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
    Json(new): Json<NewPocket>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let pocket = state.books.add_pocket(&scope, new).await?;
    Ok(Json(json!({"success": true, "pocket": pocket})))
}

pub async fn contribute(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
    Json(req): Json<ContributeRequest>,
) -> Result<Json<Value>, ApiError> {
    let scope = query.scope()?;
    let pocket = state.books.contribute(&scope, &id, req.amount).await?;
    Ok(Json(json!({"success": true, "pocket": pocket})))
}
