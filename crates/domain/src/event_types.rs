/// Event types that additionally emit an internal product-analytics signal
/// when streamed. Fixed allow-list, not configurable at runtime.
pub const INTERNALLY_TRACKED_EVENT_TYPES: [&str; 4] = [
    "delete_epic",
    "delete_issue",
    "delete_merge_request",
    "delete_work_item",
];

/// Name of the internal telemetry event emitted for tracked event types.
pub const STREAMING_TELEMETRY_EVENT_NAME: &str = "trigger_audit_event";

/// Returns whether an event type belongs to the internal-tracking allow-list.
#[must_use]
pub fn is_internally_tracked(event_type: &str) -> bool {
    INTERNALLY_TRACKED_EVENT_TYPES.contains(&event_type)
}

#[cfg(test)]
mod tests {
    use super::is_internally_tracked;

    #[test]
    fn deletion_event_types_are_tracked() {
        assert!(is_internally_tracked("delete_epic"));
        assert!(is_internally_tracked("delete_issue"));
        assert!(is_internally_tracked("delete_merge_request"));
        assert!(is_internally_tracked("delete_work_item"));
    }

    #[test]
    fn other_event_types_are_not_tracked() {
        assert!(!is_internally_tracked("project_created"));
        assert!(!is_internally_tracked("delete_project"));
    }
}
