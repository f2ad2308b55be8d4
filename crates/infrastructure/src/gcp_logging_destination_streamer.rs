use async_trait::async_trait;
use auditrelay_application::DestinationStreamer;
use auditrelay_core::{AppError, AppResult};
use auditrelay_domain::{AuditEvent, GcpLoggingDestinationConfig, StreamingDestination};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::Value;

use crate::event_payload::streamed_event_json;

const LOGGING_WRITE_URL: &str = "https://logging.googleapis.com/v2/entries:write";
const LOGGING_AUDIENCE: &str = "https://logging.googleapis.com/";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Streams audit events into Google Cloud Logging.
pub struct GcpLoggingDestinationStreamer {
    http_client: reqwest::Client,
}

impl GcpLoggingDestinationStreamer {
    /// Creates a GCP logging destination streamer sharing the provided client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[derive(Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Self-signed service-account JWT accepted by Google APIs as bearer auth;
/// no OAuth token exchange round trip is needed.
fn bearer_token(
    config: &GcpLoggingDestinationConfig,
    issued_at: DateTime<Utc>,
) -> AppResult<String> {
    let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes()).map_err(|error| {
        AppError::Validation(format!(
            "gcp destination private key is not a valid RSA PEM: {error}"
        ))
    })?;

    let claims = ServiceAccountClaims {
        iss: config.client_email.as_str(),
        sub: config.client_email.as_str(),
        aud: LOGGING_AUDIENCE,
        iat: issued_at.timestamp(),
        exp: issued_at.timestamp() + TOKEN_LIFETIME_SECONDS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|error| AppError::Internal(format!("failed to sign gcp bearer token: {error}")))
}

fn build_write_payload(
    config: &GcpLoggingDestinationConfig,
    event_type: &str,
    event: &AuditEvent,
) -> Value {
    serde_json::json!({
        "entries": [{
            "logName": config.full_log_name(),
            "resource": {"type": "global"},
            "severity": "INFO",
            "jsonPayload": streamed_event_json(event_type, event),
        }]
    })
}

#[async_trait]
impl DestinationStreamer for GcpLoggingDestinationStreamer {
    async fn stream(
        &self,
        event_type: &str,
        event: &AuditEvent,
        destination: &StreamingDestination,
    ) -> AppResult<()> {
        let config = GcpLoggingDestinationConfig::from_value(destination.config.clone())?;
        let token = bearer_token(&config, Utc::now())?;

        let response = self
            .http_client
            .post(LOGGING_WRITE_URL)
            .bearer_auth(token)
            .json(&build_write_payload(&config, event_type, event))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "gcp destination '{}' transport error: {error}",
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
                "gcp destination '{}' rejected entry with status {status}: {body}",
                destination.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use auditrelay_domain::{AuditEvent, GcpLoggingDestinationConfig};

    use super::{bearer_token, build_write_payload};

    fn config() -> GcpLoggingDestinationConfig {
        let parsed = GcpLoggingDestinationConfig::from_value(json!({
            "google_project_id_name": "acme-prod",
            "client_email": "stream@acme-prod.iam.gserviceaccount.com",
            "private_key": "not a real pem",
        }));
        parsed.unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn write_payload_targets_the_configured_log() {
        let event = AuditEvent {
            id: Some(Uuid::new_v4()),
            event_type: "delete_work_item".to_owned(),
            author_id: 3,
            entity_id: 9,
            entity_type: "Group".to_owned(),
            details: json!({}),
            ip_address: None,
            created_at: Utc::now(),
        };

        let payload = build_write_payload(&config(), "delete_work_item", &event);
        assert_eq!(
            payload["entries"][0]["logName"],
            "projects/acme-prod/logs/audit-events"
        );
        assert_eq!(payload["entries"][0]["severity"], "INFO");
        assert_eq!(
            payload["entries"][0]["jsonPayload"]["event_type"],
            "delete_work_item"
        );
    }

    #[test]
    fn malformed_private_key_is_a_validation_error() {
        let result = bearer_token(&config(), Utc::now());
        assert!(result.is_err());
    }
}
