use std::collections::HashMap;

use async_trait::async_trait;
use auditrelay_application::DestinationRepository;
use auditrelay_core::{AppError, AppResult, GroupId};
use auditrelay_domain::StreamingDestination;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed repository for streaming destination configuration.
#[derive(Clone)]
pub struct PostgresDestinationRepository {
    pool: PgPool,
}

impl PostgresDestinationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_filters(
        &self,
        rows: Vec<DestinationRow>,
    ) -> AppResult<Vec<StreamingDestination>> {
        let destination_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let filter_rows = sqlx::query_as::<_, FilterRow>(
            r#"
            SELECT destination_id, event_type
            FROM audit_event_type_filters
            WHERE destination_id = ANY($1)
            ORDER BY event_type
            "#,
        )
        .bind(destination_ids.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list destination event filters: {error}"))
        })?;

        let mut filters_by_destination: HashMap<Uuid, Vec<String>> = HashMap::new();
        for filter_row in filter_rows {
            filters_by_destination
                .entry(filter_row.destination_id)
                .or_default()
                .push(filter_row.event_type);
        }

        Ok(rows
            .into_iter()
            .map(|row| StreamingDestination {
                event_type_filters: filters_by_destination.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                category: row.category,
                config: row.config,
            })
            .collect())
    }
}

#[derive(Debug, FromRow)]
struct DestinationRow {
    id: Uuid,
    name: String,
    category: String,
    config: Value,
}

#[derive(Debug, FromRow)]
struct FilterRow {
    destination_id: Uuid,
    event_type: String,
}

#[async_trait]
impl DestinationRepository for PostgresDestinationRepository {
    async fn list_group_destinations(
        &self,
        group_id: GroupId,
    ) -> AppResult<Vec<StreamingDestination>> {
        let rows = sqlx::query_as::<_, DestinationRow>(
            r#"
            SELECT id, name, category, config
            FROM audit_event_destinations
            WHERE scope_type = 'group'
              AND group_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list destinations for group '{group_id}': {error}"
            ))
        })?;

        self.attach_filters(rows).await
    }

    async fn list_instance_destinations(&self) -> AppResult<Vec<StreamingDestination>> {
        let rows = sqlx::query_as::<_, DestinationRow>(
            r#"
            SELECT id, name, category, config
            FROM audit_event_destinations
            WHERE scope_type = 'instance'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list instance destinations: {error}"))
        })?;

        self.attach_filters(rows).await
    }
}
