//! Infrastructure adapters for audit-event streaming.

#![forbid(unsafe_code)]

mod aws_s3_destination_streamer;
mod event_payload;
mod gcp_logging_destination_streamer;
mod http_destination_streamer;
mod postgres_audit_event_repository;
mod postgres_destination_repository;
mod tracing_error_tracker;
mod tracing_internal_event_tracker;

pub use aws_s3_destination_streamer::AwsS3DestinationStreamer;
pub use gcp_logging_destination_streamer::GcpLoggingDestinationStreamer;
pub use http_destination_streamer::HttpDestinationStreamer;
pub use postgres_audit_event_repository::PostgresAuditEventRepository;
pub use postgres_destination_repository::PostgresDestinationRepository;
pub use tracing_error_tracker::TracingErrorTracker;
pub use tracing_internal_event_tracker::TracingInternalEventTracker;
