//! Route handlers
//!
//! Every handler resolves an owner scope before touching the books. JSON
//! endpoints carry the scope in the query string; multipart uploads carry it
//! as form fields next to the file.

pub mod holdings;
pub mod pockets;
pub mod summary;
pub mod transactions;

use axum::extract::Multipart;
use serde::Deserialize;

use pocketweb_core::{ManualMapping, OwnerScope};

use crate::error::ApiError;

pub async fn health() -> &'static str {
    "OK"
}

/// Scope and paging fields accepted in the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub household_id: Option<String>,
    pub member_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ScopeQuery {
    /// Resolve the owner scope, household taking precedence
    pub fn scope(&self) -> Result<OwnerScope, ApiError> {
        resolve_scope(self.household_id.clone(), self.member_id.clone())
    }

    pub fn page<T>(&self, items: Vec<T>, default_limit: usize) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

fn resolve_scope(
    household_id: Option<String>,
    member_id: Option<String>,
) -> Result<OwnerScope, ApiError> {
    match (household_id, member_id) {
        (Some(household_id), _) => Ok(OwnerScope::Household { household_id }),
        (None, Some(member_id)) => Ok(OwnerScope::Personal { member_id }),
        (None, None) => Err(ApiError::bad_request(
            "householdId or memberId is required",
        )),
    }
}

/// Parsed multipart upload: file text, owner scope, optional manual mapping
pub(crate) struct UploadForm {
    pub text: String,
    pub scope: OwnerScope,
    pub mapping: Option<ManualMapping>,
}

pub(crate) async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut text = None;
    let mut household_id = None;
    let mut member_id = None;
    let mut mapping = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "file" => text = Some(field.text().await?),
            "householdId" => household_id = Some(field.text().await?),
            "memberId" => member_id = Some(field.text().await?),
            "mapping" => {
                let raw = field.text().await?;
                if !raw.trim().is_empty() {
                    mapping = Some(serde_json::from_str(&raw).map_err(|e| {
                        ApiError::bad_request(format!("Invalid mapping JSON: {}", e))
                    })?);
                }
            }
            _ => {}
        }
    }

    let text = text.ok_or_else(|| ApiError::bad_request("A file field is required"))?;
    let scope = resolve_scope(household_id, member_id)?;
    Ok(UploadForm {
        text,
        scope,
        mapping,
    })
}

pub(crate) async fn read_preview_file(mut multipart: Multipart) -> Result<String, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            return Ok(field.text().await?);
        }
    }
    Err(ApiError::bad_request("A file field is required"))
}
