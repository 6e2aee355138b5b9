//! LeanIX Client
//!
//! Combines the HTTP wrapper with the workspace base URL and knows the
//! paths of every endpoint the sync touches.

use super::http::CatalogHttpClient;
use crate::error::{Result, SyncError};

const PATHFINDER: &str = "/services/pathfinder/v1";

/// Main LeanIX client
#[derive(Clone)]
pub struct CatalogClient {
    pub http: CatalogHttpClient,
    base_url: String,
}

impl CatalogClient {
    /// Create a new client for the given base URL (e.g. `https://acme.leanix.net`)
    pub fn new(base_url: &str) -> Result<Self> {
        let http = CatalogHttpClient::new().map_err(|e| SyncError::Config(format!("{e:#}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // MTM (authentication) API
    // =========================================================================

    /// OAuth2 token endpoint
    pub fn token_url(&self) -> String {
        format!("{}/services/mtm/v1/oauth2/token", self.base_url)
    }

    // =========================================================================
    // Pathfinder API
    // =========================================================================

    /// Build Pathfinder API URL
    pub fn pathfinder_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, PATHFINDER, path)
    }

    /// Fact sheet collection (search and create)
    pub fn fact_sheets_url(&self) -> String {
        self.pathfinder_url("factSheets")
    }

    /// Primary relation endpoint
    pub fn relations_url(&self) -> String {
        self.pathfinder_url("relations")
    }

    /// Relations scoped under a single fact sheet
    pub fn fact_sheet_relations_url(&self, fact_sheet_id: &str) -> String {
        self.pathfinder_url(&format!(
            "factSheets/{}/relations",
            urlencoding::encode(fact_sheet_id)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client = CatalogClient::new("https://acme.leanix.net/").unwrap();
        assert_eq!(
            client.token_url(),
            "https://acme.leanix.net/services/mtm/v1/oauth2/token"
        );
        assert_eq!(
            client.fact_sheets_url(),
            "https://acme.leanix.net/services/pathfinder/v1/factSheets"
        );
        assert_eq!(
            client.relations_url(),
            "https://acme.leanix.net/services/pathfinder/v1/relations"
        );
    }

    #[test]
    fn fact_sheet_id_is_path_encoded() {
        let client = CatalogClient::new("https://acme.leanix.net").unwrap();
        assert_eq!(
            client.fact_sheet_relations_url("a b/c"),
            "https://acme.leanix.net/services/pathfinder/v1/factSheets/a%20b%2Fc/relations"
        );
    }
}
