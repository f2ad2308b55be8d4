use async_trait::async_trait;
use auditrelay_application::InternalEventTracker;
use auditrelay_core::AppResult;
use tracing::info;

/// Internal-event tracker that emits product-analytics signals as
/// structured tracing events for downstream collection.
pub struct TracingInternalEventTracker;

#[async_trait]
impl InternalEventTracker for TracingInternalEventTracker {
    async fn track(&self, event_name: &str, label: &str) -> AppResult<()> {
        info!(event = event_name, label = label, "internal event tracked");
        Ok(())
    }
}
