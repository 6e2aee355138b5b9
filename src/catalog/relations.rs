//! IT Component → Application relations
//!
//! Relations are created against the global relations endpoint first and,
//! when that does not answer 200, once more against the endpoint scoped under
//! the component's own fact sheet. A 2xx from either is authoritative; the
//! follow-up verification read only feeds the logs.

use super::auth::BearerToken;
use super::client::CatalogClient;
use super::fact_sheets::FactSheetType;
use crate::error::{Result, SyncError};
use serde::Serialize;
use serde_json::Value;

/// The only relation type this crate creates
pub const RELATION_TYPE: &str = "relITComponentToApplication";

/// Body of a relation create request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRequest {
    pub from_id: String,
    pub to_id: String,
    #[serde(rename = "type")]
    pub relation_type: &'static str,
    #[serde(rename = "displayNameToFS")]
    pub display_name_to_fs: String,
    #[serde(rename = "typeFromFS")]
    pub type_from_fs: &'static str,
    #[serde(rename = "typeToFS")]
    pub type_to_fs: &'static str,
    pub status: &'static str,
    pub active_from: String,
    pub fields: Vec<Value>,
    #[serde(rename = "permittedReadACL")]
    pub permitted_read_acl: Vec<Value>,
    pub constraining_relations: Vec<Value>,
    pub ids_of_constraining_relations: Vec<String>,
}

impl RelationRequest {
    pub fn new(component_id: &str, application_id: &str, application_name: &str, active_from: &str) -> Self {
        Self {
            from_id: component_id.to_string(),
            to_id: application_id.to_string(),
            relation_type: RELATION_TYPE,
            display_name_to_fs: application_name.to_string(),
            type_from_fs: FactSheetType::ItComponent.as_str(),
            type_to_fs: FactSheetType::Application.as_str(),
            status: "ACTIVE",
            active_from: active_from.to_string(),
            fields: Vec::new(),
            permitted_read_acl: Vec::new(),
            constraining_relations: Vec::new(),
            ids_of_constraining_relations: Vec::new(),
        }
    }
}

/// Which endpoint accepted the relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationEndpoint {
    Primary,
    FactSheetScoped,
}

/// A relation LeanIX accepted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub from_id: String,
    pub to_id: String,
    #[serde(rename = "type")]
    pub relation_type: String,
    pub active_from: String,
    pub display_name: String,
    pub endpoint: RelationEndpoint,
    /// Outcome of the post-create read; informational only
    pub verified: bool,
    /// Parsed body of the create response
    pub response: Value,
}

/// Link an IT Component to its Application
///
/// `active_from` is a `YYYY-MM-DD` date, normally today's UTC date.
pub async fn link_component_to_application(
    client: &CatalogClient,
    token: &BearerToken,
    component_id: &str,
    application_id: &str,
    application_name: &str,
    active_from: &str,
) -> Result<Relation> {
    tracing::info!(
        "Creating relation: IT Component {} -> Application {}",
        component_id,
        application_id
    );

    let request = RelationRequest::new(component_id, application_id, application_name, active_from);
    let payload = serde_json::to_value(&request)
        .map_err(|e| SyncError::Relation(format!("Failed to encode relation payload: {e}")))?;
    tracing::debug!("Relation payload: {}", payload);

    let primary_url = client.relations_url();
    let mut endpoint = RelationEndpoint::Primary;
    let mut response = client
        .http
        .post_json(&primary_url, token.as_str(), &payload)
        .await
        .map_err(|e| SyncError::Relation(format!("{e:#}")))?;

    if response.status.as_u16() != 200 {
        let fallback_url = client.fact_sheet_relations_url(component_id);
        tracing::info!(
            "Primary relation endpoint returned {}, second attempt using URL: {}",
            response.status,
            fallback_url
        );

        endpoint = RelationEndpoint::FactSheetScoped;
        response = client
            .http
            .post_json(&fallback_url, token.as_str(), &payload)
            .await
            .map_err(|e| SyncError::Relation(format!("{e:#}")))?;
    }

    if !response.is_success() {
        tracing::error!("Error creating relation: {}", response.describe());
        return Err(SyncError::Relation(format!(
            "Relation endpoint returned {}",
            response.describe()
        )));
    }

    let body = response.json().unwrap_or_else(|e| {
        tracing::warn!("Relation response is not JSON: {:#}", e);
        Value::String(response.body.clone())
    });

    let verified = verify_relation(client, token, component_id, application_id).await;
    if verified {
        tracing::info!("Relation created and verified successfully");
    } else {
        tracing::warn!("Relation created but verification failed");
    }

    Ok(Relation {
        from_id: request.from_id,
        to_id: request.to_id,
        relation_type: RELATION_TYPE.to_string(),
        active_from: request.active_from,
        display_name: request.display_name_to_fs,
        endpoint,
        verified,
        response: body,
    })
}

/// Check both fact sheets' relation lists for the pair, in either direction
///
/// Never fails: any transport or parse problem just means "not verified".
pub async fn verify_relation(
    client: &CatalogClient,
    token: &BearerToken,
    component_id: &str,
    application_id: &str,
) -> bool {
    tracing::debug!(
        "Verifying relation between {} and {}",
        component_id,
        application_id
    );

    for fact_sheet_id in [component_id, application_id] {
        let url = client.fact_sheet_relations_url(fact_sheet_id);
        let no_query: [(&str, &str); 0] = [];

        let response = match client.http.get(&url, token.as_str(), &no_query).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error verifying relation via {}: {:#}", url, e);
                continue;
            }
        };

        if response.status.as_u16() != 200 {
            tracing::debug!("Verification read returned {}", response.status);
            continue;
        }

        match response.json() {
            Ok(body) if contains_pair(&body, component_id, application_id) => return true,
            Ok(_) => {}
            Err(e) => tracing::warn!("Unreadable verification response: {:#}", e),
        }
    }

    tracing::warn!("No relation found");
    false
}

/// Whether a `{data: [...]}` relation list links the two ids in either direction
pub fn contains_pair(body: &Value, a: &str, b: &str) -> bool {
    let Some(relations) = body.get("data").and_then(|v| v.as_array()) else {
        return false;
    };

    relations.iter().any(|relation| {
        let from = relation.get("fromId").and_then(|v| v.as_str());
        let to = relation.get("toId").and_then(|v| v.as_str());
        matches!((from, to), (Some(f), Some(t)) if (f == a && t == b) || (f == b && t == a))
    })
}
