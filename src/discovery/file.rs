//! JSON file source
//!
//! Accepts an array whose entries are either bare ARN strings or
//! `{"arn": ..., "tags": [{"key": ..., "value": ...}]}` objects. Entries
//! that list tags must carry the filter tag; bare ARNs are taken as already
//! filtered.

use super::{parse_arn, Discovered, ResourceDiscovery, Tag, TagFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Arn(String),
    Tagged {
        arn: String,
        #[serde(default)]
        tags: Option<Vec<Tag>>,
    },
}

#[derive(Debug, Clone)]
pub struct FileDiscovery {
    path: PathBuf,
}

impl FileDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResourceDiscovery for FileDiscovery {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn list_resources(&self, filter: &TagFilter) -> Result<Discovered> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let entries: Vec<Entry> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid resource list in {}", self.path.display()))?;

        let mut discovered = Discovered::default();

        for entry in entries {
            let (arn, tags) = match entry {
                Entry::Arn(arn) => (arn, None),
                Entry::Tagged { arn, tags } => {
                    if let Some(tags) = &tags {
                        if !filter.matches(tags) {
                            continue;
                        }
                    }
                    (arn, tags)
                }
            };

            match parse_arn(&arn, tags) {
                Some(resource) => discovered.resources.push(resource),
                None => {
                    tracing::warn!("Skipping resource with malformed ARN: {}", arn);
                    discovered.skipped += 1;
                }
            }
        }

        Ok(discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_bare_and_tagged_entries() {
        let file = write_list(
            r#"[
                "arn:aws:s3:::logs-bucket",
                {"arn": "arn:aws:sqs:eu-west-1:123456789012:jobs",
                 "tags": [{"key": "project", "value": "ABC"}]},
                {"arn": "arn:aws:sqs:eu-west-1:123456789012:other",
                 "tags": [{"key": "project", "value": "XYZ"}]}
            ]"#,
        );

        let discovery = FileDiscovery::new(file.path());
        let filter = TagFilter::new("project", "ABC");
        let discovered = tokio_test::block_on(discovery.list_resources(&filter)).unwrap();

        let names: Vec<_> = discovered
            .resources
            .iter()
            .map(|r| r.display_name().to_string())
            .collect();
        assert_eq!(names, vec!["logs-bucket", "jobs"]);
        assert_eq!(discovered.skipped, 0);
    }

    #[test]
    fn malformed_arns_are_counted() {
        let file = write_list(r#"["garbage", "arn:aws:s3:::ok"]"#);
        let discovery = FileDiscovery::new(file.path());
        let discovered =
            tokio_test::block_on(discovery.list_resources(&TagFilter::new("k", "v"))).unwrap();

        assert_eq!(discovered.resources.len(), 1);
        assert_eq!(discovered.skipped, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let discovery = FileDiscovery::new("/nonexistent/tagsync/resources.json");
        let result = tokio_test::block_on(discovery.list_resources(&TagFilter::new("k", "v")));
        assert!(result.is_err());
    }
}
