//! HTTP utilities for LeanIX REST API calls
//!
//! Unlike a typical JSON client these helpers never turn a non-2xx status
//! into an error: the sync protocol branches on exact status codes (200 vs
//! 201, primary vs fallback endpoint), so callers get the raw status and
//! body back and decide for themselves.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Status and raw body of a catalog response
#[derive(Debug, Clone)]
pub struct CatalogResponse {
    pub status: StatusCode,
    pub body: String,
}

impl CatalogResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON. An empty body parses as `Value::Null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).context("Failed to parse response JSON")
    }

    /// Short description for error messages: status plus sanitized body
    pub fn describe(&self) -> String {
        format!("{} - {}", self.status.as_u16(), sanitize_for_log(&self.body))
    }
}

/// HTTP client wrapper for LeanIX API calls
#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
}

impl CatalogHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tagsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// GET with query parameters and a bearer token
    pub async fn get<Q>(&self, url: &str, token: &str, query: &Q) -> Result<CatalogResponse>
    where
        Q: Serialize + ?Sized,
    {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        read_response(response).await
    }

    /// POST a JSON body with a bearer token
    pub async fn post_json(&self, url: &str, token: &str, body: &Value) -> Result<CatalogResponse> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        read_response(response).await
    }

    /// POST a form-encoded body with HTTP Basic credentials
    pub async fn post_form_basic<F>(
        &self,
        url: &str,
        username: &str,
        password: &str,
        form: &F,
    ) -> Result<CatalogResponse>
    where
        F: Serialize + ?Sized,
    {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .basic_auth(username, Some(password))
            .form(form)
            .send()
            .await
            .context("Failed to send request")?;

        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<CatalogResponse> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    tracing::debug!("Response {}: {}", status, sanitize_for_log(&body));

    Ok(CatalogResponse { status, body })
}

/// Format a catalog error for the operator-facing summary line
pub fn format_catalog_error(error: &dyn std::fmt::Display) -> String {
    let error_str = error.to_string();

    if error_str.contains("401") {
        return "Authentication failed. Check LEANIX_API_TOKEN (tokens are not refreshed mid-run)."
            .to_string();
    }
    if error_str.contains("403") {
        return "Permission denied. Check the API token's LeanIX permissions.".to_string();
    }
    if error_str.contains("404") {
        return "Endpoint or fact sheet not found. Check LEANIX_API_BASE_URL.".to_string();
    }
    if error_str.contains("409") {
        return "Conflict. The fact sheet or relation may already exist.".to_string();
    }
    if error_str.contains("429") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }
    if error_str.contains("500") || error_str.contains("502") || error_str.contains("503") {
        return "LeanIX service temporarily unavailable. Please try again.".to_string();
    }

    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncError;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let out = sanitize_for_log(&body);
        assert!(out.starts_with(&"x".repeat(200)));
        assert!(out.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        // Must not panic on a multi-byte boundary
        let out = sanitize_for_log(&body);
        assert!(out.contains("truncated"));
    }

    #[test]
    fn sanitize_strips_control_chars() {
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }

    #[test]
    fn empty_body_parses_as_null() {
        let response = CatalogResponse {
            status: StatusCode::NO_CONTENT,
            body: String::new(),
        };
        assert_eq!(response.json().unwrap(), Value::Null);
    }

    #[test]
    fn format_error_maps_status_codes() {
        let err = SyncError::Auth("token endpoint returned 401 - denied".into());
        assert!(format_catalog_error(&err).starts_with("Authentication failed"));

        let err = SyncError::CatalogQuery("503 - down".into());
        assert!(format_catalog_error(&err).contains("temporarily unavailable"));
    }

    #[test]
    fn format_error_passes_through_other_messages() {
        let err = SyncError::ApplicationNotFound("Billing".into());
        assert_eq!(
            format_catalog_error(&err),
            "Application 'Billing' not found in LeanIX"
        );
    }
}
