use std::sync::Arc;

use async_trait::async_trait;
use auditrelay_core::AppResult;
use auditrelay_domain::{
    AuditEvent, DestinationCategory, STREAMING_TELEMETRY_EVENT_NAME, StreamingDestination,
    is_internally_tracked,
};
use uuid::Uuid;

use crate::streaming_ports::{DestinationStreamer, ErrorTracker, InternalEventTracker};

mod scopes;

pub use scopes::{GroupStreamScope, InstanceStreamScope};

/// Eligibility gate and destination resolution for one event-family scope.
///
/// Both methods are required to implement the trait at all, so an incomplete
/// scope is a compile error rather than a runtime contract violation.
#[async_trait]
pub trait StreamScope: Send + Sync {
    /// Business rule deciding whether streaming applies to this event.
    async fn is_streamable(&self, event: &AuditEvent) -> AppResult<bool>;

    /// Resolves the destinations applicable to this event's scope.
    async fn destinations(&self, event: &AuditEvent) -> AppResult<Vec<StreamingDestination>>;
}

/// Closed dispatch table mapping each destination category to its adapter.
///
/// The category set is closed: adding one means a new `DestinationCategory`
/// variant, a new field here, and the exhaustive match below refusing to
/// compile until both exist.
#[derive(Clone)]
pub struct DestinationStreamerRegistry {
    http: Arc<dyn DestinationStreamer>,
    aws: Arc<dyn DestinationStreamer>,
    gcp: Arc<dyn DestinationStreamer>,
}

impl DestinationStreamerRegistry {
    /// Creates a registry from one adapter per category.
    #[must_use]
    pub fn new(
        http: Arc<dyn DestinationStreamer>,
        aws: Arc<dyn DestinationStreamer>,
        gcp: Arc<dyn DestinationStreamer>,
    ) -> Self {
        Self { http, aws, gcp }
    }

    fn streamer_for(&self, category: DestinationCategory) -> &Arc<dyn DestinationStreamer> {
        match category {
            DestinationCategory::Http => &self.http,
            DestinationCategory::Aws => &self.aws,
            DestinationCategory::Gcp => &self.gcp,
        }
    }
}

/// Delivery status for one destination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The adapter accepted the event.
    Delivered,
    /// The destination's event-type filters excluded this event.
    Skipped,
    /// Dispatch failed; the error was reported, not propagated.
    Failed(String),
}

/// Per-destination result of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationStreamOutcome {
    /// Destination identifier.
    pub destination_id: Uuid,
    /// Destination name for log context.
    pub destination_name: String,
    /// Delivery status.
    pub status: DeliveryStatus,
}

/// Orchestrates best-effort delivery of one audit event to every destination
/// in a scope, isolating per-destination failures.
#[derive(Clone)]
pub struct AuditEventStreamerService {
    registry: DestinationStreamerRegistry,
    error_tracker: Arc<dyn ErrorTracker>,
    internal_events: Arc<dyn InternalEventTracker>,
}

impl AuditEventStreamerService {
    /// Creates a streamer service.
    #[must_use]
    pub fn new(
        registry: DestinationStreamerRegistry,
        error_tracker: Arc<dyn ErrorTracker>,
        internal_events: Arc<dyn InternalEventTracker>,
    ) -> Self {
        Self {
            registry,
            error_tracker,
            internal_events,
        }
    }

    /// Streams one audit event to every destination of the scope.
    ///
    /// Gating off or an empty scope produces no side effects. Every resolved
    /// destination gets exactly one dispatch attempt; a failed attempt is
    /// reported to the error tracker and recorded in the returned outcomes,
    /// never raised. Only scope resolution and telemetry-sink failures
    /// propagate.
    pub async fn execute(
        &self,
        scope: &dyn StreamScope,
        event_type: &str,
        event: &AuditEvent,
    ) -> AppResult<Vec<DestinationStreamOutcome>> {
        if !scope.is_streamable(event).await? {
            return Ok(Vec::new());
        }

        let destinations = scope.destinations(event).await?;
        let mut outcomes = Vec::with_capacity(destinations.len());

        for destination in &destinations {
            // Fires once per destination, not once per execute. Pinned by
            // `telemetry_fires_once_per_tracked_destination`.
            if is_internally_tracked(event_type) {
                self.internal_events
                    .track(STREAMING_TELEMETRY_EVENT_NAME, event_type)
                    .await?;
            }

            if !destination.allows_event_type(event_type) {
                outcomes.push(DestinationStreamOutcome {
                    destination_id: destination.id,
                    destination_name: destination.name.clone(),
                    status: DeliveryStatus::Skipped,
                });
                continue;
            }

            let status = match self
                .stream_to_destination(event_type, event, destination)
                .await
            {
                Ok(()) => DeliveryStatus::Delivered,
                Err(error) => {
                    self.error_tracker.report(&error);
                    DeliveryStatus::Failed(error.to_string())
                }
            };

            outcomes.push(DestinationStreamOutcome {
                destination_id: destination.id,
                destination_name: destination.name.clone(),
                status,
            });
        }

        Ok(outcomes)
    }

    async fn stream_to_destination(
        &self,
        event_type: &str,
        event: &AuditEvent,
        destination: &StreamingDestination,
    ) -> AppResult<()> {
        let category = DestinationCategory::parse(destination.category.as_str())?;
        self.registry
            .streamer_for(category)
            .stream(event_type, event, destination)
            .await
    }
}
