use std::sync::Arc;

use auditrelay_core::{AppError, AppResult};
use auditrelay_domain::AuditEvent;

use crate::streamer_service::{
    AuditEventStreamerService, DestinationStreamOutcome, GroupStreamScope, InstanceStreamScope,
};
use crate::streaming_ports::{
    AuditEventRepository, AuditEventStreamJob, DestinationRepository, StreamJobScope,
};

/// Resolves queued stream jobs into audit events and hands them to the
/// streamer with the scope the job was enqueued for.
#[derive(Clone)]
pub struct StreamJobService {
    streamer: AuditEventStreamerService,
    audit_events: Arc<dyn AuditEventRepository>,
    destinations: Arc<dyn DestinationRepository>,
    streaming_enabled: bool,
}

impl StreamJobService {
    /// Creates a stream-job service.
    #[must_use]
    pub fn new(
        streamer: AuditEventStreamerService,
        audit_events: Arc<dyn AuditEventRepository>,
        destinations: Arc<dyn DestinationRepository>,
        streaming_enabled: bool,
    ) -> Self {
        Self {
            streamer,
            audit_events,
            destinations,
            streaming_enabled,
        }
    }

    /// Processes one claimed stream job.
    ///
    /// Resolution failures (missing event, contradictory payload) propagate
    /// so the caller can mark the job failed; per-destination delivery
    /// failures are already isolated inside the streamer.
    pub async fn process_job(
        &self,
        job: &AuditEventStreamJob,
    ) -> AppResult<Vec<DestinationStreamOutcome>> {
        let event = self.resolve_event(job).await?;

        match job.scope {
            StreamJobScope::Group(group_id) => {
                let scope = GroupStreamScope::new(
                    self.destinations.clone(),
                    group_id,
                    self.streaming_enabled,
                );
                self.streamer
                    .execute(&scope, job.event_name.as_str(), &event)
                    .await
            }
            StreamJobScope::Instance => {
                let scope =
                    InstanceStreamScope::new(self.destinations.clone(), self.streaming_enabled);
                self.streamer
                    .execute(&scope, job.event_name.as_str(), &event)
                    .await
            }
        }
    }

    async fn resolve_event(&self, job: &AuditEventStreamJob) -> AppResult<AuditEvent> {
        match (job.audit_event_id, job.audit_event_json.as_ref()) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "audit_event_id and audit_event_json cannot be passed together".to_owned(),
            )),
            (Some(event_id), None) => self
                .audit_events
                .find_event(event_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("audit event '{event_id}' does not exist"))
                }),
            (None, Some(json)) => serde_json::from_value(json.clone()).map_err(|error| {
                AppError::Validation(format!("invalid inline audit event payload: {error}"))
            }),
            (None, None) => Err(AppError::Validation(
                "stream job requires audit_event_id or audit_event_json".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
