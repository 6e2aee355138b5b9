//! Resource discovery
//!
//! Finds the cloud resources carrying the sync tag. The orchestrator only
//! sees the [`ResourceDiscovery`] trait; the AWS Tagging API and a JSON file
//! are the two concrete sources.
//!
//! - [`arn`] - Turns an ARN into a [`ResourceDescriptor`]
//! - [`tagging`] - AWS Resource Groups Tagging API
//! - [`file`] - JSON export on disk (offline runs)

pub mod arn;
pub mod file;
pub mod tagging;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use arn::parse_arn;
pub use file::FileDiscovery;
pub use tagging::TaggingApiDiscovery;

/// Tag key/value used to select resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    pub tag_key: String,
    pub tag_value: String,
}

impl TagFilter {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            tag_key: key.to_string(),
            tag_value: value.to_string(),
        }
    }

    /// Whether a tag list carries the filter's key with the filter's value
    pub fn matches(&self, tags: &[Tag]) -> bool {
        tags.iter()
            .any(|t| t.key == self.tag_key && t.value == self.tag_value)
    }
}

/// A single resource tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A discovered cloud resource
///
/// `name` and `tags` are `None` when unknown; they are never empty strings
/// or empty lists standing in for "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub service: String,
    pub region: String,
    pub arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl ResourceDescriptor {
    /// Name for log lines, `-` when unknown
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// Outcome of a discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub resources: Vec<ResourceDescriptor>,
    /// ARNs that matched the filter but could not be parsed
    pub skipped: usize,
}

/// Source of tagged cloud resources
#[async_trait]
pub trait ResourceDiscovery: Send + Sync {
    fn name(&self) -> &'static str;
    async fn list_resources(&self, filter: &TagFilter) -> Result<Discovered>;
}

/// Fixed resource list, already filtered
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    resources: Vec<ResourceDescriptor>,
}

impl StaticDiscovery {
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl ResourceDiscovery for StaticDiscovery {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn list_resources(&self, _filter: &TagFilter) -> Result<Discovered> {
        Ok(Discovered {
            resources: self.resources.clone(),
            skipped: 0,
        })
    }
}

/// Log the discovery summary, one line per resource
pub fn log_discovered(discovered: &Discovered, filter: &TagFilter) {
    tracing::info!(
        "Found {} resources with {}={} tag",
        discovered.resources.len(),
        filter.tag_key,
        filter.tag_value
    );
    for resource in &discovered.resources {
        tracing::info!("- {}: {}", resource.service, resource.display_name());
    }
    if discovered.skipped > 0 {
        tracing::warn!("Skipped {} resources with malformed ARNs", discovered.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str) -> Tag {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn filter_matches_exact_pair_only() {
        let filter = TagFilter::new("project", "ABC");
        assert!(filter.matches(&[tag("env", "prod"), tag("project", "ABC")]));
        assert!(!filter.matches(&[tag("project", "abc")]));
        assert!(!filter.matches(&[tag("owner", "ABC")]));
        assert!(!filter.matches(&[]));
    }

    #[test]
    fn unknown_fields_are_omitted_from_json() {
        let resource = ResourceDescriptor {
            service: "sqs".into(),
            region: "eu-west-1".into(),
            arn: "arn:aws:sqs:eu-west-1:123".into(),
            name: None,
            tags: None,
        };
        let value = serde_json::to_value(&resource).unwrap();
        assert!(value.get("name").is_none());
        assert!(value.get("tags").is_none());
        assert_eq!(resource.display_name(), "-");
    }
}
