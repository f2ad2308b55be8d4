//! Domain entities and invariants for audit-event streaming.

#![forbid(unsafe_code)]

mod audit_event;
mod destination;
mod event_types;

pub use audit_event::AuditEvent;
pub use destination::{
    AwsS3DestinationConfig, DestinationCategory, GcpLoggingDestinationConfig,
    HttpDestinationConfig, StreamingDestination,
};
pub use event_types::{
    INTERNALLY_TRACKED_EVENT_TYPES, STREAMING_TELEMETRY_EVENT_NAME, is_internally_tracked,
};
