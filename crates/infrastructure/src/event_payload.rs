use auditrelay_domain::AuditEvent;
use serde_json::Value;

/// Builds the wire payload shared by every destination adapter.
///
/// `event_type` is stamped explicitly so a sink always sees the operation
/// name the delivery was enqueued under, even for stream-only events.
pub(crate) fn streamed_event_json(event_type: &str, event: &AuditEvent) -> Value {
    serde_json::json!({
        "id": event.id,
        "event_type": event_type,
        "author_id": event.author_id,
        "entity_id": event.entity_id,
        "entity_type": event.entity_type,
        "details": event.details,
        "ip_address": event.ip_address,
        "created_at": event.created_at,
    })
}
