use async_trait::async_trait;
use auditrelay_application::DestinationStreamer;
use auditrelay_core::{AppError, AppResult};
use auditrelay_domain::{AuditEvent, AwsS3DestinationConfig, StreamingDestination};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event_payload::streamed_event_json;

mod sigv4;

/// Streams audit events as JSON objects into Amazon S3 buckets.
pub struct AwsS3DestinationStreamer {
    http_client: reqwest::Client,
}

impl AwsS3DestinationStreamer {
    /// Creates an S3 destination streamer sharing the provided client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

/// Object key scheme: one prefix per event type, dated and keyed by the
/// event id. Stream-only events get a random id so deliveries never clash.
fn object_key(event_type: &str, event: &AuditEvent, timestamp: DateTime<Utc>) -> String {
    let event_id = event.id.unwrap_or_else(Uuid::new_v4);
    format!(
        "{event_type}/{}_{event_id}.json",
        timestamp.format("%Y-%m-%d")
    )
}

#[async_trait]
impl DestinationStreamer for AwsS3DestinationStreamer {
    async fn stream(
        &self,
        event_type: &str,
        event: &AuditEvent,
        destination: &StreamingDestination,
    ) -> AppResult<()> {
        let config = AwsS3DestinationConfig::from_value(destination.config.clone())?;

        let body = serde_json::to_vec(&streamed_event_json(event_type, event)).map_err(
            |error| AppError::Internal(format!("failed to serialize audit event: {error}")),
        )?;

        let timestamp = Utc::now();
        let host = format!(
            "{}.s3.{}.amazonaws.com",
            config.bucket_name, config.aws_region
        );
        let path = format!("/{}", object_key(event_type, event, timestamp));
        let payload_hash = sigv4::sha256_hex(body.as_slice());

        let signed = sigv4::sign(&sigv4::SigningInput {
            method: "PUT",
            host: host.as_str(),
            path: path.as_str(),
            region: config.aws_region.as_str(),
            service: "s3",
            payload_hash: payload_hash.as_str(),
            timestamp,
            access_key_id: config.access_key_id.as_str(),
            secret_access_key: config.secret_access_key.as_str(),
        })?;

        let response = self
            .http_client
            .put(format!("https://{host}{path}"))
            .header("x-amz-date", signed.amz_date.as_str())
            .header("x-amz-content-sha256", payload_hash.as_str())
            .header("Authorization", signed.authorization.as_str())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "aws destination '{}' transport error: {error}",
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
                "aws destination '{}' rejected object with status {status}: {body}",
                destination.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use auditrelay_domain::AuditEvent;

    use super::object_key;

    #[test]
    fn object_key_groups_by_event_type_and_date() {
        let event_id = Uuid::new_v4();
        let event = AuditEvent {
            id: Some(event_id),
            event_type: "delete_epic".to_owned(),
            author_id: 1,
            entity_id: 2,
            entity_type: "Group".to_owned(),
            details: json!({}),
            ip_address: None,
            created_at: Utc::now(),
        };
        let timestamp = Utc
            .with_ymd_and_hms(2026, 8, 27, 12, 0, 0)
            .single()
            .unwrap_or_else(|| unreachable!());

        assert_eq!(
            object_key("delete_epic", &event, timestamp),
            format!("delete_epic/2026-08-27_{event_id}.json")
        );
    }

    #[test]
    fn stream_only_events_get_a_unique_key() {
        let event = AuditEvent {
            id: None,
            event_type: "delete_issue".to_owned(),
            author_id: 1,
            entity_id: 2,
            entity_type: "Project".to_owned(),
            details: json!({}),
            ip_address: None,
            created_at: Utc::now(),
        };
        let timestamp = Utc::now();

        let first = object_key("delete_issue", &event, timestamp);
        let second = object_key("delete_issue", &event, timestamp);
        assert_ne!(first, second);
    }
}
