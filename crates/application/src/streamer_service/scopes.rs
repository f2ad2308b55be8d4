use std::sync::Arc;

use async_trait::async_trait;
use auditrelay_core::{AppResult, GroupId};
use auditrelay_domain::{AuditEvent, StreamingDestination};

use crate::streaming_ports::DestinationRepository;

use super::StreamScope;

/// Scope resolving destinations configured on a single group.
pub struct GroupStreamScope {
    repository: Arc<dyn DestinationRepository>,
    group_id: GroupId,
    streaming_enabled: bool,
}

impl GroupStreamScope {
    /// Creates a group scope.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DestinationRepository>,
        group_id: GroupId,
        streaming_enabled: bool,
    ) -> Self {
        Self {
            repository,
            group_id,
            streaming_enabled,
        }
    }
}

#[async_trait]
impl StreamScope for GroupStreamScope {
    async fn is_streamable(&self, _event: &AuditEvent) -> AppResult<bool> {
        if !self.streaming_enabled {
            return Ok(false);
        }

        let destinations = self.repository.list_group_destinations(self.group_id).await?;
        Ok(!destinations.is_empty())
    }

    async fn destinations(&self, _event: &AuditEvent) -> AppResult<Vec<StreamingDestination>> {
        self.repository.list_group_destinations(self.group_id).await
    }
}

/// Scope resolving instance-wide destinations.
pub struct InstanceStreamScope {
    repository: Arc<dyn DestinationRepository>,
    streaming_enabled: bool,
}

impl InstanceStreamScope {
    /// Creates an instance scope.
    #[must_use]
    pub fn new(repository: Arc<dyn DestinationRepository>, streaming_enabled: bool) -> Self {
        Self {
            repository,
            streaming_enabled,
        }
    }
}

#[async_trait]
impl StreamScope for InstanceStreamScope {
    async fn is_streamable(&self, _event: &AuditEvent) -> AppResult<bool> {
        if !self.streaming_enabled {
            return Ok(false);
        }

        let destinations = self.repository.list_instance_destinations().await?;
        Ok(!destinations.is_empty())
    }

    async fn destinations(&self, _event: &AuditEvent) -> AppResult<Vec<StreamingDestination>> {
        self.repository.list_instance_destinations().await
    }
}
