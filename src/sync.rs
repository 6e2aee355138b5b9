//! Sync orchestration
//!
//! discovery → token → application lookup → per resource (register, link).
//! The first three steps are fatal on failure; per-resource failures end up
//! in that resource's [`SyncResult`] and the batch carries on.

use crate::catalog::{
    acquire_token, find_application, link_component_to_application, register_component,
    BearerToken, CatalogClient,
};
use crate::config::{utc_today, RunClock, Settings};
use crate::discovery::{log_discovered, ResourceDescriptor, ResourceDiscovery};
use crate::error::{Result, SyncError};
use crate::report::{
    BatchReport, ComponentOutcome, HandlerResponse, Outcome, RunMetadata, Summary, SyncResult,
};
use futures::stream::{self, StreamExt};
use tracing::Instrument;

/// Values resolved once per batch and shared read-only by every resource
struct BatchContext<'a> {
    client: &'a CatalogClient,
    token: BearerToken,
    application_id: String,
    application_name: &'a str,
    run_date: String,
}

/// Run metadata recorded in both success and failure reports
pub fn run_metadata(settings: &Settings, clock: &RunClock) -> RunMetadata {
    RunMetadata {
        run_id: clock.run_id,
        timestamp: clock.timestamp(),
        user: settings.actor.clone(),
        filter: settings.filter.clone(),
        application: settings.application_name.clone(),
    }
}

/// Run one batch, returning a report or the fatal error that aborted it
pub async fn run_sync(
    discovery: &dyn ResourceDiscovery,
    client: &CatalogClient,
    settings: &Settings,
    clock: &RunClock,
) -> Result<BatchReport> {
    tracing::info!("Getting AWS resources from {}...", discovery.name());
    let discovered = discovery
        .list_resources(&settings.filter)
        .await
        .map_err(|e| SyncError::Discovery(format!("{e:#}")))?;
    log_discovered(&discovered, &settings.filter);

    tracing::info!("Getting LeanIX token...");
    let token = acquire_token(client, &settings.api_token).await?;

    let application_id = find_application(client, &token, &settings.application_name)
        .await?
        .ok_or_else(|| SyncError::ApplicationNotFound(settings.application_name.clone()))?;

    let batch = BatchContext {
        client,
        token,
        application_id,
        application_name: &settings.application_name,
        run_date: clock.date(),
    };

    tracing::info!("Creating {} fact sheets...", discovered.resources.len());

    let results: Vec<SyncResult> = stream::iter(&discovered.resources)
        .then(|resource| {
            let span = tracing::info_span!(
                "resource",
                service = %resource.service,
                arn = %resource.arn
            );
            sync_resource(&batch, resource).instrument(span)
        })
        .collect()
        .await;

    let summary = Summary::from_results(&results, discovered.skipped);
    tracing::info!(
        "Sync finished: {} succeeded, {} failed, {} relation errors",
        summary.succeeded,
        summary.failed,
        summary.relation_errors
    );

    Ok(BatchReport {
        resources: discovered.resources,
        results,
        summary,
        metadata: run_metadata(settings, clock),
    })
}

/// Register one resource and link it; never fails, the outcome says how it went
async fn sync_resource(batch: &BatchContext<'_>, resource: &ResourceDescriptor) -> SyncResult {
    tracing::info!(
        "Processing {} resource: {}",
        resource.service,
        resource.display_name()
    );

    let outcome = match register_component(batch.client, &batch.token, resource, &batch.run_date)
        .await
    {
        Ok(record) => {
            let linked = link_component_to_application(
                batch.client,
                &batch.token,
                &record.id,
                &batch.application_id,
                batch.application_name,
                &utc_today(),
            )
            .await;

            let (relation, relation_error) = match linked {
                Ok(relation) => (Some(relation), None),
                Err(e) => {
                    tracing::error!("Failed to create relation: {}", e);
                    (None, Some(e.to_string()))
                }
            };

            Outcome::Success {
                record: ComponentOutcome {
                    record,
                    relation,
                    relation_error,
                },
            }
        }
        Err(e) => {
            tracing::error!(
                "Error processing {} resource {}: {}",
                resource.service,
                resource.display_name(),
                e
            );
            Outcome::Error {
                error: e.to_string(),
            }
        }
    };

    SyncResult {
        resource: resource.clone(),
        outcome,
        linked_application: batch.application_name.to_string(),
    }
}

/// Entry point: run a batch and wrap the outcome in a handler response
pub async fn handle(
    discovery: &dyn ResourceDiscovery,
    settings: &Settings,
    clock: &RunClock,
) -> HandlerResponse {
    let span = tracing::info_span!(
        "batch",
        run_id = %clock.run_id,
        application = %settings.application_name
    );

    async {
        let result = match CatalogClient::new(&settings.base_url) {
            Ok(client) => run_sync(discovery, &client, settings, clock).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => HandlerResponse::ok(&report),
            Err(e) => {
                tracing::error!("Sync aborted: {}", e);
                HandlerResponse::failure(&e, &run_metadata(settings, clock))
            }
        }
    }
    .instrument(span)
    .await
}
