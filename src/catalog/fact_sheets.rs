//! LeanIX Fact Sheets
//!
//! Record types and the filtered search used both to locate the parent
//! Application and to confirm a freshly created IT Component by name.

use super::auth::BearerToken;
use super::client::CatalogClient;
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fact sheet types this crate works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactSheetType {
    Application,
    #[serde(rename = "ITComponent")]
    ItComponent,
}

impl FactSheetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::ItComponent => "ITComponent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactSheetStatus {
    Active,
    Archived,
}

/// A catalog record whose id was assigned by LeanIX
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub fact_sheet_type: FactSheetType,
    pub status: FactSheetStatus,
}

/// Run a `type`/`name` search with page size 1 and return the first id
pub async fn search_first_id(
    client: &CatalogClient,
    token: &BearerToken,
    fact_sheet_type: FactSheetType,
    name: &str,
) -> anyhow::Result<Option<String>> {
    let url = client.fact_sheets_url();
    let query = [
        ("type", fact_sheet_type.as_str()),
        ("name", name),
        ("pageSize", "1"),
    ];

    let response = client.http.get(&url, token.as_str(), &query).await?;

    if !response.is_success() {
        return Err(anyhow::anyhow!("API request failed: {}", response.describe()));
    }

    Ok(first_id(&response.json()?))
}

/// Id of the first entry of a `{data: [...]}` search response
pub fn first_id(response: &Value) -> Option<String> {
    response
        .get("data")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("id"))
        .and_then(id_as_string)
}

/// Ids are strings in practice; tolerate numbers too
pub(crate) fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Locate the Application fact sheet by name
///
/// `Ok(None)` means the search succeeded but matched nothing; deciding
/// whether that is fatal is up to the caller.
pub async fn find_application(
    client: &CatalogClient,
    token: &BearerToken,
    name: &str,
) -> Result<Option<String>> {
    tracing::info!("Looking up application: {}", name);

    let id = search_first_id(client, token, FactSheetType::Application, name)
        .await
        .map_err(|e| {
            tracing::error!("Error getting application fact sheet: {:#}", e);
            SyncError::CatalogQuery(format!("{e:#}"))
        })?;

    match &id {
        Some(id) => tracing::info!("Found application ID: {}", id),
        None => tracing::warn!("Application not found: {}", name),
    }

    Ok(id)
}

/// Look up an IT Component id by name, treating every failure as "not found"
pub async fn find_component_by_name(
    client: &CatalogClient,
    token: &BearerToken,
    name: &str,
) -> Option<String> {
    tracing::debug!("Searching for fact sheet with name: {}", name);

    match search_first_id(client, token, FactSheetType::ItComponent, name).await {
        Ok(Some(id)) => {
            tracing::info!("Found fact sheet ID: {}", id);
            Some(id)
        }
        Ok(None) => {
            tracing::warn!("No fact sheet found with name: {}", name);
            None
        }
        Err(e) => {
            tracing::error!("Error searching for fact sheet: {:#}", e);
            None
        }
    }
}
