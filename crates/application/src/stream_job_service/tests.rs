use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use auditrelay_core::{AppError, AppResult, GroupId};
use auditrelay_domain::{AuditEvent, StreamingDestination};

use crate::streamer_service::{AuditEventStreamerService, DestinationStreamerRegistry};
use crate::streaming_ports::{
    AuditEventRepository, AuditEventStreamJob, DestinationRepository, DestinationStreamer,
    ErrorTracker, InternalEventTracker, StreamJobScope,
};

use super::StreamJobService;

fn persisted_event(event_id: Uuid) -> AuditEvent {
    AuditEvent {
        id: Some(event_id),
        event_type: "delete_issue".to_owned(),
        author_id: 7,
        entity_id: 42,
        entity_type: "Project".to_owned(),
        details: json!({}),
        ip_address: None,
        created_at: Utc::now(),
    }
}

fn http_destination() -> StreamingDestination {
    StreamingDestination {
        id: Uuid::new_v4(),
        name: "compliance sink".to_owned(),
        category: "http".to_owned(),
        config: json!({}),
        event_type_filters: Vec::new(),
    }
}

#[derive(Default)]
struct RecordingStreamer {
    streamed_event_ids: Mutex<Vec<Option<Uuid>>>,
}

#[async_trait]
impl DestinationStreamer for RecordingStreamer {
    async fn stream(
        &self,
        _event_type: &str,
        event: &AuditEvent,
        _destination: &StreamingDestination,
    ) -> AppResult<()> {
        self.streamed_event_ids.lock().await.push(event.id);
        Ok(())
    }
}

struct NullErrorTracker;

impl ErrorTracker for NullErrorTracker {
    fn report(&self, _error: &AppError) {}
}

struct NullInternalTracker;

#[async_trait]
impl InternalEventTracker for NullInternalTracker {
    async fn track(&self, _event_name: &str, _label: &str) -> AppResult<()> {
        Ok(())
    }
}

struct FakeAuditEventRepository {
    event: Option<AuditEvent>,
}

#[async_trait]
impl AuditEventRepository for FakeAuditEventRepository {
    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<AuditEvent>> {
        Ok(self
            .event
            .clone()
            .filter(|event| event.id == Some(event_id)))
    }

    async fn claim_pending_jobs(&self, _limit: usize) -> AppResult<Vec<AuditEventStreamJob>> {
        Ok(Vec::new())
    }

    async fn complete_job(&self, _job_id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn fail_job(&self, _job_id: Uuid, _reason: &str) -> AppResult<()> {
        Ok(())
    }
}

struct FakeDestinationRepository {
    destinations: Vec<StreamingDestination>,
}

#[async_trait]
impl DestinationRepository for FakeDestinationRepository {
    async fn list_group_destinations(
        &self,
        _group_id: GroupId,
    ) -> AppResult<Vec<StreamingDestination>> {
        Ok(self.destinations.clone())
    }

    async fn list_instance_destinations(&self) -> AppResult<Vec<StreamingDestination>> {
        Ok(self.destinations.clone())
    }
}

fn job_service(
    streamer: Arc<RecordingStreamer>,
    stored_event: Option<AuditEvent>,
    destinations: Vec<StreamingDestination>,
    streaming_enabled: bool,
) -> StreamJobService {
    let registry =
        DestinationStreamerRegistry::new(streamer.clone(), streamer.clone(), streamer);
    let streamer_service = AuditEventStreamerService::new(
        registry,
        Arc::new(NullErrorTracker),
        Arc::new(NullInternalTracker),
    );
    StreamJobService::new(
        streamer_service,
        Arc::new(FakeAuditEventRepository {
            event: stored_event,
        }),
        Arc::new(FakeDestinationRepository { destinations }),
        streaming_enabled,
    )
}

fn group_job(audit_event_id: Option<Uuid>, audit_event_json: Option<serde_json::Value>) -> AuditEventStreamJob {
    AuditEventStreamJob {
        job_id: Uuid::new_v4(),
        event_name: "delete_issue".to_owned(),
        audit_event_id,
        audit_event_json,
        scope: StreamJobScope::Group(GroupId::new()),
    }
}

#[tokio::test]
async fn job_with_both_id_and_json_is_rejected() {
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(streamer, None, vec![http_destination()], true);

    let job = group_job(Some(Uuid::new_v4()), Some(json!({})));
    let result = service.process_job(&job).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn job_with_neither_id_nor_json_is_rejected() {
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(streamer, None, vec![http_destination()], true);

    let result = service.process_job(&group_job(None, None)).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn job_with_unknown_event_id_is_not_found() {
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(streamer, None, vec![http_destination()], true);

    let result = service
        .process_job(&group_job(Some(Uuid::new_v4()), None))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn job_with_persisted_event_streams_it() {
    let event_id = Uuid::new_v4();
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(
        streamer.clone(),
        Some(persisted_event(event_id)),
        vec![http_destination()],
        true,
    );

    let outcomes = service
        .process_job(&group_job(Some(event_id), None))
        .await;

    assert_eq!(outcomes.unwrap_or_else(|_| unreachable!()).len(), 1);
    assert_eq!(
        streamer.streamed_event_ids.lock().await.as_slice(),
        &[Some(event_id)]
    );
}

#[tokio::test]
async fn stream_only_job_delivers_inline_payload() {
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(streamer.clone(), None, vec![http_destination()], true);

    let inline = json!({
        "id": null,
        "event_type": "delete_issue",
        "author_id": 7,
        "entity_id": 42,
        "entity_type": "Project",
        "ip_address": null,
        "created_at": "2026-08-01T09:30:00Z",
    });
    let outcomes = service.process_job(&group_job(None, Some(inline))).await;

    assert_eq!(outcomes.unwrap_or_else(|_| unreachable!()).len(), 1);
    assert_eq!(
        streamer.streamed_event_ids.lock().await.as_slice(),
        &[None]
    );
}

#[tokio::test]
async fn disabled_streaming_resolves_but_delivers_nothing() {
    let event_id = Uuid::new_v4();
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(
        streamer.clone(),
        Some(persisted_event(event_id)),
        vec![http_destination()],
        false,
    );

    let outcomes = service
        .process_job(&group_job(Some(event_id), None))
        .await;

    assert!(outcomes.unwrap_or_else(|_| unreachable!()).is_empty());
    assert!(streamer.streamed_event_ids.lock().await.is_empty());
}

#[tokio::test]
async fn instance_job_uses_instance_destinations() {
    let event_id = Uuid::new_v4();
    let streamer = Arc::new(RecordingStreamer::default());
    let service = job_service(
        streamer.clone(),
        Some(persisted_event(event_id)),
        vec![http_destination(), http_destination()],
        true,
    );

    let job = AuditEventStreamJob {
        job_id: Uuid::new_v4(),
        event_name: "delete_issue".to_owned(),
        audit_event_id: Some(event_id),
        audit_event_json: None,
        scope: StreamJobScope::Instance,
    };
    let outcomes = service.process_job(&job).await;

    assert_eq!(outcomes.unwrap_or_else(|_| unreachable!()).len(), 2);
}
