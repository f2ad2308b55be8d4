use async_trait::async_trait;
use auditrelay_core::AppResult;
use auditrelay_domain::{AuditEvent, StreamingDestination};

/// Port for category-specific destination delivery.
///
/// One implementation exists per destination category; serialization and
/// transport details live entirely behind this contract.
#[async_trait]
pub trait DestinationStreamer: Send + Sync {
    /// Serializes and transmits one audit event to one destination.
    async fn stream(
        &self,
        event_type: &str,
        event: &AuditEvent,
        destination: &StreamingDestination,
    ) -> AppResult<()>;
}
