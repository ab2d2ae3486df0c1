//
//  cloud-databases
//  api/v5/replication.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Read replicas and PostgreSQL logical replication slots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tasks::TaskResponse;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

/// Leader and replicas of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Remotes {
    /// Leader ID, if this deployment is a read-only replica.
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(default)]
    pub replicas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRemotesResponse {
    #[serde(default)]
    pub remotes: Remotes,
}

/// Promotion settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Skip the backup taken right after promotion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_initial_backup: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalReplicationSlot {
    pub name: String,
    pub database_name: String,
    /// Output plugin, e.g. `wal2json`.
    pub plugin_type: String,
}

#[derive(Serialize)]
struct PromotionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    promotion: Option<&'a Promotion>,
}

#[derive(Serialize)]
struct SlotBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    logical_replication_slot: Option<&'a LogicalReplicationSlot>,
}

pub const LIST_REMOTES: Operation = Operation {
    id: "ListRemotes",
    method: HttpMethod::Get,
    path: "/deployments/{id}/remotes",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const RESYNC_REPLICA: Operation = Operation {
    id: "ResyncReplica",
    method: HttpMethod::Post,
    path: "/deployments/{id}/remotes/resync",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

pub const PROMOTE_READ_ONLY_REPLICA: Operation = Operation {
    id: "PromoteReadOnlyReplica",
    method: HttpMethod::Post,
    path: "/deployments/{id}/remotes/promotion",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const CREATE_LOGICAL_REPLICATION_SLOT: Operation = Operation {
    id: "CreateLogicalReplicationSlot",
    method: HttpMethod::Post,
    path: "/deployments/{id}/postgresql/logical_replication_slots",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const DELETE_LOGICAL_REPLICATION_SLOT: Operation = Operation {
    id: "DeleteLogicalReplicationSlot",
    method: HttpMethod::Delete,
    path: "/deployments/{id}/postgresql/logical_replication_slots/{name}",
    path_params: &["id", "name"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::list_remotes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRemotesOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl ListRemotesOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for ListRemotesOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::resync_replica`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResyncReplicaOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl ResyncReplicaOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for ResyncReplicaOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::promote_read_only_replica`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromoteReadOnlyReplicaOptions {
    pub id: String,
    pub promotion: Option<Promotion>,
    pub headers: HashMap<String, String>,
}

impl PromoteReadOnlyReplicaOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_promotion(mut self, promotion: Promotion) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for PromoteReadOnlyReplicaOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers)
            .json_body(&PromotionBody {
                promotion: self.promotion.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::create_logical_replication_slot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateLogicalReplicationSlotOptions {
    pub id: String,
    pub logical_replication_slot: Option<LogicalReplicationSlot>,
    pub headers: HashMap<String, String>,
}

impl CreateLogicalReplicationSlotOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_slot(mut self, slot: LogicalReplicationSlot) -> Self {
        self.logical_replication_slot = Some(slot);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for CreateLogicalReplicationSlotOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers)
            .json_body(&SlotBody {
                logical_replication_slot: self.logical_replication_slot.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::delete_logical_replication_slot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteLogicalReplicationSlotOptions {
    pub id: String,
    /// Slot name.
    pub name: String,
    pub headers: HashMap<String, String>,
}

impl DeleteLogicalReplicationSlotOptions {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for DeleteLogicalReplicationSlotOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("name", &self.name)
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    /// Lists the leader and read-only replicas of a deployment.
    pub async fn list_remotes(
        &self,
        options: &ListRemotesOptions,
    ) -> Result<DetailedResponse<ListRemotesResponse>, ApiError> {
        self.list_remotes_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_remotes_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListRemotesOptions,
    ) -> Result<DetailedResponse<ListRemotesResponse>, ApiError> {
        self.execute(ctx, &LIST_REMOTES, Some(options)).await
    }

    /// Re-synchronizes a read-only replica with its leader.
    pub async fn resync_replica(
        &self,
        options: &ResyncReplicaOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.resync_replica_with_context(&self.default_context(), options)
            .await
    }

    pub async fn resync_replica_with_context(
        &self,
        ctx: &RequestContext,
        options: &ResyncReplicaOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &RESYNC_REPLICA, Some(options)).await
    }

    /// Promotes a read-only replica to a standalone deployment.
    pub async fn promote_read_only_replica(
        &self,
        options: &PromoteReadOnlyReplicaOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.promote_read_only_replica_with_context(&self.default_context(), options)
            .await
    }

    pub async fn promote_read_only_replica_with_context(
        &self,
        ctx: &RequestContext,
        options: &PromoteReadOnlyReplicaOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &PROMOTE_READ_ONLY_REPLICA, Some(options))
            .await
    }

    pub async fn create_logical_replication_slot(
        &self,
        options: &CreateLogicalReplicationSlotOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.create_logical_replication_slot_with_context(&self.default_context(), options)
            .await
    }

    pub async fn create_logical_replication_slot_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateLogicalReplicationSlotOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &CREATE_LOGICAL_REPLICATION_SLOT, Some(options))
            .await
    }

    pub async fn delete_logical_replication_slot(
        &self,
        options: &DeleteLogicalReplicationSlotOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.delete_logical_replication_slot_with_context(&self.default_context(), options)
            .await
    }

    pub async fn delete_logical_replication_slot_with_context(
        &self,
        ctx: &RequestContext,
        options: &DeleteLogicalReplicationSlotOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &DELETE_LOGICAL_REPLICATION_SLOT, Some(options))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remotes_deserialization() {
        let response: ListRemotesResponse =
            serde_json::from_str(r#"{"remotes":{"leader":"crn:leader","replicas":[]}}"#).unwrap();
        assert_eq!(response.remotes.leader.as_deref(), Some("crn:leader"));
        assert!(response.remotes.replicas.is_empty());
    }

    #[test]
    fn test_promotion_body() {
        let params = PromoteReadOnlyReplicaOptions::new("dep")
            .with_promotion(Promotion {
                skip_initial_backup: Some(true),
            })
            .params()
            .unwrap();
        assert_eq!(params.body(), Some(&json!({"promotion": {"skip_initial_backup": true}})));
    }

    #[test]
    fn test_slot_body_and_delete_path() {
        let params = CreateLogicalReplicationSlotOptions::new("dep")
            .with_slot(LogicalReplicationSlot {
                name: "slot1".to_string(),
                database_name: "ibmclouddb".to_string(),
                plugin_type: "wal2json".to_string(),
            })
            .params()
            .unwrap();
        assert_eq!(
            params.body().unwrap()["logical_replication_slot"]["plugin_type"],
            "wal2json"
        );

        let params = DeleteLogicalReplicationSlotOptions::new("dep", "slot1").params().unwrap();
        assert_eq!(params.path_value("name"), Some("slot1"));
    }
}
