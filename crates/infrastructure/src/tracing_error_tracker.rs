use auditrelay_application::ErrorTracker;
use auditrelay_core::AppError;
use tracing::error;

/// Error tracker that surfaces captured streaming failures through tracing.
pub struct TracingErrorTracker;

impl ErrorTracker for TracingErrorTracker {
    fn report(&self, reported: &AppError) {
        error!(error = %reported, "audit event streaming failure");
    }
}
