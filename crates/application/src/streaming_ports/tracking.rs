use async_trait::async_trait;
use auditrelay_core::{AppError, AppResult};

/// Port for reporting captured per-destination failures to observability.
pub trait ErrorTracker: Send + Sync {
    /// Records one error, fire-and-forget.
    fn report(&self, error: &AppError);
}

/// Port for emitting internal product-analytics events.
#[async_trait]
pub trait InternalEventTracker: Send + Sync {
    /// Emits one internal event with a single label property.
    async fn track(&self, event_name: &str, label: &str) -> AppResult<()>;
}
