//! Scope summary endpoint

use axum::extract::{Query, State};
use axum::Json;

use pocketweb_core::SummaryReport;

use super::ScopeQuery;
use crate::error::ApiError;
use crate::AppState;

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<SummaryReport>, ApiError> {
    let scope = query.scope()?;
    let report = state.books.summary(&scope).await?;
    Ok(Json(report))
}
