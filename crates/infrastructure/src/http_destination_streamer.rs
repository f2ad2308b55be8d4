use async_trait::async_trait;
use auditrelay_application::DestinationStreamer;
use auditrelay_core::{AppError, AppResult};
use auditrelay_domain::{AuditEvent, HttpDestinationConfig, StreamingDestination};

use crate::event_payload::streamed_event_json;

/// Streams audit events to configured HTTP endpoints.
pub struct HttpDestinationStreamer {
    http_client: reqwest::Client,
}

impl HttpDestinationStreamer {
    /// Creates an HTTP destination streamer sharing the provided client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl DestinationStreamer for HttpDestinationStreamer {
    async fn stream(
        &self,
        event_type: &str,
        event: &AuditEvent,
        destination: &StreamingDestination,
    ) -> AppResult<()> {
        let config = HttpDestinationConfig::from_value(destination.config.clone())?;

        let mut builder = self
            .http_client
            .post(config.url.as_str())
            .header(
                "X-Audit-Event-Streaming-Token",
                config.verification_token.as_str(),
            )
            .header("X-Audit-Event-Type", event_type);

        for (key, value) in &config.custom_headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder
            .json(&streamed_event_json(event_type, event))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "http destination '{}' transport error: {error}",
                    destination.name
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "http destination '{}' rejected event with status {status}: {body}",
                destination.name
            )));
        }

        Ok(())
    }
}
