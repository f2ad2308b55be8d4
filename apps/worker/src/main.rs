//! Auditrelay audit-event delivery worker.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use auditrelay_application::{
    AuditEventRepository, AuditEventStreamerService, DeliveryStatus, DestinationStreamerRegistry,
    StreamJobService,
};
use auditrelay_core::{AppError, AppResult};
use auditrelay_infrastructure::{
    AwsS3DestinationStreamer, GcpLoggingDestinationStreamer, HttpDestinationStreamer,
    PostgresAuditEventRepository, PostgresDestinationRepository, TracingErrorTracker,
    TracingInternalEventTracker,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    claim_limit: usize,
    poll_interval_ms: u64,
    stream_request_timeout_secs: u64,
    streaming_disabled: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    if config.streaming_disabled {
        info!("audit event streaming is disabled by DISABLE_AUDIT_EVENT_STREAMING; exiting");
        return Ok(());
    }

    let pool = connect_pool(config.database_url.as_str()).await?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.stream_request_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let audit_events = Arc::new(PostgresAuditEventRepository::new(pool.clone()));
    let job_service = build_stream_job_service(
        pool,
        http_client,
        audit_events.clone(),
        !config.streaming_disabled,
    );

    info!(
        claim_limit = config.claim_limit,
        poll_interval_ms = config.poll_interval_ms,
        stream_request_timeout_secs = config.stream_request_timeout_secs,
        "auditrelay-worker started"
    );

    loop {
        let jobs = match audit_events.claim_pending_jobs(config.claim_limit).await {
            Ok(jobs) => jobs,
            Err(error) => {
                warn!(error = %error, "failed to claim stream jobs");
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                continue;
            }
        };

        if jobs.is_empty() {
            tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
            continue;
        }

        info!(claimed_count = jobs.len(), "claimed stream jobs");

        for job in jobs {
            match job_service.process_job(&job).await {
                Ok(outcomes) => {
                    let delivered = outcomes
                        .iter()
                        .filter(|outcome| outcome.status == DeliveryStatus::Delivered)
                        .count();
                    let failed = outcomes
                        .iter()
                        .filter(|outcome| matches!(outcome.status, DeliveryStatus::Failed(_)))
                        .count();
                    info!(
                        job_id = %job.job_id,
                        event_name = %job.event_name,
                        destinations = outcomes.len(),
                        delivered,
                        failed,
                        "stream job processed"
                    );
                    if let Err(error) = audit_events.complete_job(job.job_id).await {
                        warn!(
                            job_id = %job.job_id,
                            error = %error,
                            "failed to mark stream job completed"
                        );
                    }
                }
                Err(error) => {
                    warn!(
                        job_id = %job.job_id,
                        event_name = %job.event_name,
                        error = %error,
                        "stream job failed"
                    );
                    if let Err(mark_error) = audit_events
                        .fail_job(job.job_id, error.to_string().as_str())
                        .await
                    {
                        warn!(
                            job_id = %job.job_id,
                            error = %mark_error,
                            "failed to mark stream job failed"
                        );
                    }
                }
            }
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_stream_job_service(
    pool: PgPool,
    http_client: reqwest::Client,
    audit_events: Arc<PostgresAuditEventRepository>,
    streaming_enabled: bool,
) -> StreamJobService {
    let registry = DestinationStreamerRegistry::new(
        Arc::new(HttpDestinationStreamer::new(http_client.clone())),
        Arc::new(AwsS3DestinationStreamer::new(http_client.clone())),
        Arc::new(GcpLoggingDestinationStreamer::new(http_client)),
    );
    let streamer = AuditEventStreamerService::new(
        registry,
        Arc::new(TracingErrorTracker),
        Arc::new(TracingInternalEventTracker),
    );

    StreamJobService::new(
        streamer,
        audit_events,
        Arc::new(PostgresDestinationRepository::new(pool)),
        streaming_enabled,
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let claim_limit = parse_env_usize("WORKER_CLAIM_LIMIT", 10)?;
        let poll_interval_ms = parse_env_u64("WORKER_POLL_INTERVAL_MS", 1500)?;
        let stream_request_timeout_secs = parse_env_u64("STREAM_REQUEST_TIMEOUT_SECS", 15)?;
        let streaming_disabled = parse_env_bool("DISABLE_AUDIT_EVENT_STREAMING", false)?;

        if claim_limit == 0 {
            return Err(AppError::Validation(
                "WORKER_CLAIM_LIMIT must be greater than zero".to_owned(),
            ));
        }

        if poll_interval_ms == 0 {
            return Err(AppError::Validation(
                "WORKER_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        if stream_request_timeout_secs == 0 {
            return Err(AppError::Validation(
                "STREAM_REQUEST_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            claim_limit,
            poll_interval_ms,
            stream_request_timeout_secs,
            streaming_disabled,
        })
    }
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> AppResult<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(AppError::Validation(format!(
                "invalid {name} value '{other}': expected a boolean"
            ))),
        },
        Err(_) => Ok(default),
    }
}
