//! ARN parsing
//!
//! `arn:partition:service:region:account:resource`. The resource part may
//! itself contain `:` (e.g. `function:name`) or `/` (e.g. `table/name`); the
//! name is the last `:` segment, trimmed to its last `/` part.

use super::{ResourceDescriptor, Tag};

/// Minimum segments for service and region to be present
const MIN_SEGMENTS: usize = 4;

/// Minimum segments for a resource name to be present
const NAMED_SEGMENTS: usize = 6;

/// Build a descriptor from an ARN, or `None` if it lacks service and region
pub fn parse_arn(arn: &str, tags: Option<Vec<Tag>>) -> Option<ResourceDescriptor> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() < MIN_SEGMENTS || parts[2].is_empty() {
        return None;
    }

    let name = if parts.len() >= NAMED_SEGMENTS {
        parts
            .last()
            .and_then(|last| last.rsplit('/').next())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    Some(ResourceDescriptor {
        service: parts[2].to_string(),
        region: parts[3].to_string(),
        arn: arn.to_string(),
        name,
        tags: tags.filter(|t| !t.is_empty()),
    })
}
