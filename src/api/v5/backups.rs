//
//  cloud-databases
//  api/v5/backups.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Backups and point-in-time recovery.
//!
//! Deployments are backed up daily; on-demand backups can be started at any
//! time. PostgreSQL and MySQL deployments can also be restored to a point in
//! time after [`PointInTimeRecoveryData::earliest_point_in_time_recovery_time`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tasks::TaskResponse;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,

    #[serde(default)]
    pub deployment_id: Option<String>,

    /// `scheduled` or `on_demand`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// `running`, `completed` or `failed`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub is_downloadable: Option<bool>,

    #[serde(default)]
    pub is_restorable: Option<bool>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backups {
    #[serde(default)]
    pub backups: Vec<Backup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetBackupInfoResponse {
    #[serde(default)]
    pub backup: Option<Backup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointInTimeRecoveryData {
    #[serde(default)]
    pub earliest_point_in_time_recovery_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPitrDataResponse {
    #[serde(default)]
    pub point_in_time_recovery_data: PointInTimeRecoveryData,
}

pub const LIST_DEPLOYMENT_BACKUPS: Operation = Operation {
    id: "ListDeploymentBackups",
    method: HttpMethod::Get,
    path: "/deployments/{id}/backups",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const GET_BACKUP_INFO: Operation = Operation {
    id: "GetBackupInfo",
    method: HttpMethod::Get,
    path: "/backups/{backup_id}",
    path_params: &["backup_id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const START_ONDEMAND_BACKUP: Operation = Operation {
    id: "StartOndemandBackup",
    method: HttpMethod::Post,
    path: "/deployments/{id}/backups",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

pub const GET_PITR_DATA: Operation = Operation {
    id: "GetPitrData",
    method: HttpMethod::Get,
    path: "/deployments/{id}/point_in_time_recovery_data",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::list_deployment_backups`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDeploymentBackupsOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl ListDeploymentBackupsOptions {
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

impl OperationOptions for ListDeploymentBackupsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::get_backup_info`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetBackupInfoOptions {
    pub backup_id: String,
    pub headers: HashMap<String, String>,
}

impl GetBackupInfoOptions {
    pub fn new(backup_id: impl Into<String>) -> Self {
        Self {
            backup_id: backup_id.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for GetBackupInfoOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("backup_id", &self.backup_id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::start_ondemand_backup`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartOndemandBackupOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl StartOndemandBackupOptions {
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

impl OperationOptions for StartOndemandBackupOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::get_pitr_data`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetPitrDataOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl GetPitrDataOptions {
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

impl OperationOptions for GetPitrDataOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    pub async fn list_deployment_backups(
        &self,
        options: &ListDeploymentBackupsOptions,
    ) -> Result<DetailedResponse<Backups>, ApiError> {
        self.list_deployment_backups_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_deployment_backups_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListDeploymentBackupsOptions,
    ) -> Result<DetailedResponse<Backups>, ApiError> {
        self.execute(ctx, &LIST_DEPLOYMENT_BACKUPS, Some(options)).await
    }

    pub async fn get_backup_info(
        &self,
        options: &GetBackupInfoOptions,
    ) -> Result<DetailedResponse<GetBackupInfoResponse>, ApiError> {
        self.get_backup_info_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_backup_info_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetBackupInfoOptions,
    ) -> Result<DetailedResponse<GetBackupInfoResponse>, ApiError> {
        self.execute(ctx, &GET_BACKUP_INFO, Some(options)).await
    }

    /// Starts a backup outside the daily schedule.
    pub async fn start_ondemand_backup(
        &self,
        options: &StartOndemandBackupOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.start_ondemand_backup_with_context(&self.default_context(), options)
            .await
    }

    pub async fn start_ondemand_backup_with_context(
        &self,
        ctx: &RequestContext,
        options: &StartOndemandBackupOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &START_ONDEMAND_BACKUP, Some(options)).await
    }

    /// Gets the earliest time the deployment can be restored to.
    pub async fn get_pitr_data(
        &self,
        options: &GetPitrDataOptions,
    ) -> Result<DetailedResponse<GetPitrDataResponse>, ApiError> {
        self.get_pitr_data_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_pitr_data_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetPitrDataOptions,
    ) -> Result<DetailedResponse<GetPitrDataResponse>, ApiError> {
        self.execute(ctx, &GET_PITR_DATA, Some(options)).await
    }
}
