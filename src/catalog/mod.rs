//! LeanIX catalog interaction module
//!
//! Everything that talks to the catalog service: authentication, the HTTP
//! wrapper, fact sheet search, IT Component registration and relations.
//!
//! # Module Structure
//!
//! - [`auth`] - OAuth2 client-credentials token exchange
//! - [`client`] - Base URL handling and endpoint paths
//! - [`http`] - HTTP utilities returning raw status + body
//! - [`fact_sheets`] - Record types and search (Application lookup)
//! - [`components`] - IT Component creation with id fallback
//! - [`relations`] - Relation creation, endpoint fallback and verification
//!
//! # Example
//!
//! ```ignore
//! use tagsync::catalog::{auth, client::CatalogClient, fact_sheets};
//!
//! async fn example() -> tagsync::Result<()> {
//!     let client = CatalogClient::new("https://acme.leanix.net")?;
//!     let token = auth::acquire_token(&client, "api-token").await?;
//!     let app = fact_sheets::find_application(&client, &token, "Billing").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod components;
pub mod fact_sheets;
pub mod http;
pub mod relations;

pub use auth::{acquire_token, BearerToken};
pub use client::CatalogClient;
pub use components::register_component;
pub use fact_sheets::{find_application, CatalogRecord, FactSheetStatus, FactSheetType};
pub use relations::{link_component_to_application, Relation};
