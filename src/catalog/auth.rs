//! LeanIX Authentication
//!
//! Exchanges the workspace API token for a short-lived bearer token using
//! the OAuth2 client-credentials grant. The token is not cached or refreshed:
//! one exchange per batch run.

use super::client::CatalogClient;
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::fmt;

/// Username LeanIX expects in the Basic header of the token exchange
const API_TOKEN_USER: &str = "apitoken";

/// Short-lived access token returned by the token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the token out of logs and panic messages
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchange the API credential for a bearer token
pub async fn acquire_token(client: &CatalogClient, api_token: &str) -> Result<BearerToken> {
    let url = client.token_url();

    let response = client
        .http
        .post_form_basic(
            &url,
            API_TOKEN_USER,
            api_token,
            &[("grant_type", "client_credentials")],
        )
        .await
        .map_err(|e| SyncError::Auth(format!("Token request failed: {e:#}")))?;

    if !response.is_success() {
        tracing::error!("Token endpoint returned {}", response.describe());
        return Err(SyncError::Auth(format!(
            "Token endpoint returned {}",
            response.describe()
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&response.body)
        .map_err(|e| SyncError::Auth(format!("Failed to parse token response: {e}")))?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => {
            tracing::info!("Obtained LeanIX access token");
            Ok(BearerToken(token))
        }
        _ => Err(SyncError::Auth(
            "Token response did not contain an access_token".to_string(),
        )),
    }
}
