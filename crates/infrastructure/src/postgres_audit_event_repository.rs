use async_trait::async_trait;
use auditrelay_application::{AuditEventRepository, AuditEventStreamJob, StreamJobScope};
use auditrelay_core::{AppError, AppResult};
use auditrelay_domain::AuditEvent;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed repository for audit events and the stream-job queue.
#[derive(Clone)]
pub struct PostgresAuditEventRepository {
    pool: PgPool,
}

impl PostgresAuditEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditEventRow {
    id: Uuid,
    event_type: String,
    author_id: i64,
    entity_id: i64,
    entity_type: String,
    details: Value,
    ip_address: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
struct StreamJobRow {
    id: Uuid,
    event_name: String,
    audit_event_id: Option<Uuid>,
    audit_event_json: Option<Value>,
    scope_type: String,
    group_id: Option<Uuid>,
}

fn stream_job_from_row(row: StreamJobRow) -> AppResult<AuditEventStreamJob> {
    let scope = StreamJobScope::parse(row.scope_type.as_str(), row.group_id)?;
    Ok(AuditEventStreamJob {
        job_id: row.id,
        event_name: row.event_name,
        audit_event_id: row.audit_event_id,
        audit_event_json: row.audit_event_json,
        scope,
    })
}

#[async_trait]
impl AuditEventRepository for PostgresAuditEventRepository {
    async fn find_event(&self, event_id: Uuid) -> AppResult<Option<AuditEvent>> {
        let row = sqlx::query_as::<_, AuditEventRow>(
            r#"
            SELECT id, event_type, author_id, entity_id, entity_type, details, ip_address, created_at
            FROM audit_events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load audit event '{event_id}': {error}"))
        })?;

        Ok(row.map(|row| AuditEvent {
            id: Some(row.id),
            event_type: row.event_type,
            author_id: row.author_id,
            entity_id: row.entity_id,
            entity_type: row.entity_type,
            details: row.details,
            ip_address: row.ip_address,
            created_at: row.created_at,
        }))
    }

    async fn claim_pending_jobs(&self, limit: usize) -> AppResult<Vec<AuditEventStreamJob>> {
        let capped_limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid claim limit: {error}")))?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start stream job claim transaction: {error}"))
        })?;

        let rows = sqlx::query_as::<_, StreamJobRow>(
            r#"
            WITH candidate_jobs AS (
                SELECT id
                FROM audit_event_stream_jobs
                WHERE status = 'pending'
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE audit_event_stream_jobs jobs
            SET status = 'processing'
            FROM candidate_jobs
            WHERE jobs.id = candidate_jobs.id
            RETURNING
                jobs.id,
                jobs.event_name,
                jobs.audit_event_id,
                jobs.audit_event_json,
                jobs.scope_type,
                jobs.group_id
            "#,
        )
        .bind(capped_limit)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to claim pending stream jobs: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit stream job claim transaction: {error}"
            ))
        })?;

        rows.into_iter().map(stream_job_from_row).collect()
    }

    async fn complete_job(&self, job_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE audit_event_stream_jobs
            SET status = 'completed', processed_at = now()
            WHERE id = $1
              AND status = 'processing'
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to complete stream job '{job_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "stream job '{job_id}' is not currently being processed"
            )));
        }

        Ok(())
    }

    async fn fail_job(&self, job_id: Uuid, reason: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE audit_event_stream_jobs
            SET status = 'failed', failure_reason = $2, processed_at = now()
            WHERE id = $1
              AND status = 'processing'
            "#,
        )
        .bind(job_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark stream job '{job_id}' failed: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "stream job '{job_id}' is not currently being processed"
            )));
        }

        Ok(())
    }
}
