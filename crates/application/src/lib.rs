//! Application services and ports for audit-event streaming.

#![forbid(unsafe_code)]

mod stream_job_service;
mod streamer_service;
mod streaming_ports;

pub use stream_job_service::StreamJobService;
pub use streamer_service::{
    AuditEventStreamerService, DeliveryStatus, DestinationStreamOutcome,
    DestinationStreamerRegistry, GroupStreamScope, InstanceStreamScope, StreamScope,
};
pub use streaming_ports::{
    AuditEventRepository, AuditEventStreamJob, DestinationRepository, DestinationStreamer,
    ErrorTracker, InternalEventTracker, StreamJobScope,
};
