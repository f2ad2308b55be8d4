use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Immutable record of a sensitive action destined for compliance logging.
///
/// Stream-only events are delivered without ever being persisted, so `id`
/// is absent for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Persisted event identifier, absent for stream-only events.
    pub id: Option<Uuid>,
    /// Stable audit operation name, for example `delete_epic`.
    pub event_type: String,
    /// Identifier of the actor that performed the action.
    pub author_id: i64,
    /// Identifier of the affected entity.
    pub entity_id: i64,
    /// Type label of the affected entity.
    pub entity_type: String,
    /// Opaque detail payload describing the action.
    #[serde(default)]
    pub details: Value,
    /// Caller IP address if available.
    pub ip_address: Option<String>,
    /// Moment the action occurred.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::AuditEvent;

    #[test]
    fn deserializes_stream_only_event_without_id() {
        let parsed: Result<AuditEvent, _> = serde_json::from_value(serde_json::json!({
            "id": null,
            "event_type": "delete_issue",
            "author_id": 7,
            "entity_id": 42,
            "entity_type": "Project",
            "ip_address": null,
            "created_at": "2026-08-01T09:30:00Z",
        }));
        let event = parsed.unwrap_or_else(|_| unreachable!());

        assert!(event.id.is_none());
        assert_eq!(event.event_type, "delete_issue");
        assert!(event.details.is_null());
    }
}
