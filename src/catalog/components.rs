//! IT Component registration
//!
//! Creates one `ITComponent` fact sheet per discovered resource. LeanIX
//! deployments disagree on the shape of the create response, so the id is
//! pulled out by [`IdShape`] strategies in a fixed order, and when none of
//! them match the component is confirmed through a search by name.

use super::auth::BearerToken;
use super::client::CatalogClient;
use super::fact_sheets::{
    find_component_by_name, id_as_string, CatalogRecord, FactSheetStatus, FactSheetType,
};
use crate::discovery::ResourceDescriptor;
use crate::error::{Result, SyncError};
use serde_json::{json, Value};

/// Prefix of every IT Component display name
pub const DISPLAY_NAME_PREFIX: &str = "AWS-";

/// Where a create response carried the new fact sheet id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdShape {
    /// `{"id": ...}`
    TopLevel,
    /// `{"data": {"id": ...}}`
    NestedObject,
    /// `{"data": [{"id": ...}, ...]}`
    NestedList,
}

impl IdShape {
    /// Extraction order; the first shape that yields an id wins
    pub const PRIORITY: [IdShape; 3] = [Self::TopLevel, Self::NestedObject, Self::NestedList];

    fn extract(self, body: &Value) -> Option<String> {
        match self {
            Self::TopLevel => body.get("id").and_then(id_as_string),
            Self::NestedObject => body
                .get("data")
                .filter(|d| d.is_object())
                .and_then(|d| d.get("id"))
                .and_then(id_as_string),
            Self::NestedList => body
                .get("data")
                .and_then(|d| d.as_array())
                .and_then(|arr| arr.first())
                .and_then(|first| first.get("id"))
                .and_then(id_as_string),
        }
    }
}

/// Decode the fact sheet id from a create response
pub fn extract_created_id(body: &Value) -> Option<(IdShape, String)> {
    IdShape::PRIORITY
        .iter()
        .find_map(|shape| shape.extract(body).map(|id| (*shape, id)))
}

/// Catalog display name for a resource; every resource of a service maps to the same name
pub fn display_name(resource: &ResourceDescriptor) -> String {
    format!("{}{}", DISPLAY_NAME_PREFIX, resource.service.to_uppercase())
}

/// Create payload for an IT Component whose lifecycle starts on `start_date`
pub fn component_payload(display_name: &str, start_date: &str) -> Value {
    json!({
        "name": display_name,
        "description": display_name,
        "type": FactSheetType::ItComponent.as_str(),
        "status": "ACTIVE",
        "fields": [
            {
                "name": "lifecycle",
                "data": {
                    "type": "Lifecycle",
                    "phases": [
                        {
                            "phase": "ACTIVE",
                            "startDate": start_date
                        }
                    ]
                }
            }
        ]
    })
}

/// Create the IT Component fact sheet for a resource
///
/// The returned record is rebuilt from the request plus the confirmed id,
/// since the response body is not reliable enough to read anything else from.
pub async fn register_component(
    client: &CatalogClient,
    token: &BearerToken,
    resource: &ResourceDescriptor,
    run_date: &str,
) -> Result<CatalogRecord> {
    let name = display_name(resource);
    tracing::info!("Creating fact sheet for {}", name);

    let url = client.fact_sheets_url();
    let payload = component_payload(&name, run_date);
    tracing::debug!("Request payload: {}", payload);

    let response = client
        .http
        .post_json(&url, token.as_str(), &payload)
        .await
        .map_err(|e| SyncError::Registration(format!("{e:#}")))?;

    if !matches!(response.status.as_u16(), 200 | 201) {
        tracing::error!(
            "Failed to create IT Component. Status: {}",
            response.describe()
        );
        return Err(SyncError::Registration(format!(
            "Failed to create IT Component. Status: {}",
            response.describe()
        )));
    }

    let body = response.json().unwrap_or_else(|e| {
        tracing::warn!("Create response is not JSON ({:#}), falling back to lookup", e);
        Value::Null
    });

    let id = match extract_created_id(&body) {
        Some((shape, id)) => {
            tracing::debug!("Fact sheet id found in {:?} response shape", shape);
            id
        }
        None => {
            tracing::info!("No ID in response, attempting to fetch by name...");
            match find_component_by_name(client, token, &name).await {
                Some(id) => id,
                None => {
                    tracing::error!("Failed to get Fact Sheet ID, full response: {}", body);
                    return Err(SyncError::Registration(
                        "No ID received for created IT Component".to_string(),
                    ));
                }
            }
        }
    };

    tracing::info!("IT Component created successfully with ID: {}", id);

    Ok(CatalogRecord {
        id,
        name,
        fact_sheet_type: FactSheetType::ItComponent,
        status: FactSheetStatus::Active,
    })
}
