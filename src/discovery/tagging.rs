//! AWS Resource Groups Tagging API source
//!
//! One paginated `GetResources` call with a single tag filter covers every
//! taggable service in the configured region.

use super::{parse_arn, Discovered, ResourceDiscovery, Tag, TagFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_resourcegroupstaggingapi as tagging;
use aws_sdk_resourcegroupstaggingapi::config::Region;

#[derive(Debug, Clone, Default)]
pub struct TaggingApiDiscovery {
    /// Region override; the default provider chain is used when `None`
    region: Option<String>,
}

impl TaggingApiDiscovery {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    async fn client(&self) -> tagging::Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let conf = loader.load().await;
        tagging::Client::new(&conf)
    }
}

#[async_trait]
impl ResourceDiscovery for TaggingApiDiscovery {
    fn name(&self) -> &'static str {
        "tagging-api"
    }

    async fn list_resources(&self, filter: &TagFilter) -> Result<Discovered> {
        let client = self.client().await;

        let tag_filter = tagging::types::TagFilter::builder()
            .key(&filter.tag_key)
            .values(&filter.tag_value)
            .build();

        let mut pages = client
            .get_resources()
            .tag_filters(tag_filter)
            .into_paginator()
            .send();

        let mut discovered = Discovered::default();

        while let Some(page) = pages.next().await {
            let page = page.context("GetResources call failed")?;

            for mapping in page.resource_tag_mapping_list() {
                let Some(arn) = mapping.resource_arn() else {
                    continue;
                };

                let tags: Vec<Tag> = mapping
                    .tags()
                    .iter()
                    .map(|t| Tag {
                        key: t.key().to_string(),
                        value: t.value().to_string(),
                    })
                    .collect();

                match parse_arn(arn, Some(tags)) {
                    Some(resource) => discovered.resources.push(resource),
                    None => {
                        tracing::warn!("Skipping resource with malformed ARN: {}", arn);
                        discovered.skipped += 1;
                    }
                }
            }
        }

        Ok(discovered)
    }
}
