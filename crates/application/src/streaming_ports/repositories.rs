use async_trait::async_trait;
use auditrelay_core::{AppError, AppResult, GroupId};
use auditrelay_domain::{AuditEvent, StreamingDestination};
use serde_json::Value;
use uuid::Uuid;

/// Port for reading configured streaming destinations.
#[async_trait]
pub trait DestinationRepository: Send + Sync {
    /// Lists destinations configured for one group.
    async fn list_group_destinations(
        &self,
        group_id: GroupId,
    ) -> AppResult<Vec<StreamingDestination>>;

    /// Lists instance-wide destinations.
    async fn list_instance_destinations(&self) -> AppResult<Vec<StreamingDestination>>;
}

/// Scope a queued stream job resolves its destinations against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamJobScope {
    /// Group-level destinations.
    Group(GroupId),
    /// Instance-wide destinations.
    Instance,
}

impl StreamJobScope {
    /// Returns the stable storage value for this scope.
    #[must_use]
    pub fn scope_type(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Instance => "instance",
        }
    }

    /// Parses persisted scope columns into a scope.
    pub fn parse(scope_type: &str, group_id: Option<Uuid>) -> AppResult<Self> {
        match (scope_type, group_id) {
            ("group", Some(group_id)) => Ok(Self::Group(GroupId::from_uuid(group_id))),
            ("group", None) => Err(AppError::Validation(
                "group-scoped stream job is missing its group id".to_owned(),
            )),
            ("instance", _) => Ok(Self::Instance),
            (other, _) => Err(AppError::Validation(format!(
                "unknown stream job scope '{other}'"
            ))),
        }
    }
}

/// A queued audit-event delivery job.
///
/// Carries either the identifier of a persisted audit event or the inline
/// JSON of a stream-only event, never both.
#[derive(Debug, Clone)]
pub struct AuditEventStreamJob {
    /// Queue job identifier.
    pub job_id: Uuid,
    /// Audit operation name for the event being delivered.
    pub event_name: String,
    /// Identifier of a persisted audit event.
    pub audit_event_id: Option<Uuid>,
    /// Inline JSON payload for stream-only events.
    pub audit_event_json: Option<Value>,
    /// Scope the destinations are resolved against.
    pub scope: StreamJobScope,
}

/// Port for persisted audit events and the stream-job queue.
#[async_trait]
pub trait AuditEventRepository: Send + Sync {
    /// Finds a persisted audit event by identifier.
    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<AuditEvent>>;

    /// Claims up to `limit` pending stream jobs for processing.
    async fn claim_pending_jobs(&self, limit: usize) -> AppResult<Vec<AuditEventStreamJob>>;

    /// Marks a claimed job as processed.
    async fn complete_job(&self, job_id: Uuid) -> AppResult<()>;

    /// Marks a claimed job as failed with a reason.
    async fn fail_job(&self, job_id: Uuid, reason: &str) -> AppResult<()>;
}
