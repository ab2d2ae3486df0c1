//
//  cloud-databases
//  api/v5/management.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployment management: connection termination and in-place version
//! upgrades.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::tasks::TaskResponse;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

pub const KILL_CONNECTIONS: Operation = Operation {
    id: "KillConnections",
    method: HttpMethod::Delete,
    path: "/deployments/{id}/management/database_connections",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

pub const SET_DATABASE_INPLACE_VERSION_UPGRADE: Operation = Operation {
    id: "SetDatabaseInplaceVersionUpgrade",
    method: HttpMethod::Patch,
    path: "/deployments/{id}/version",
    path_params: &["id"],
    query_params: &["skip_backup", "expiration_datetime"],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::kill_connections`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KillConnectionsOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl KillConnectionsOptions {
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

impl OperationOptions for KillConnectionsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

#[derive(Serialize)]
struct VersionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

/// Options for [`CloudDatabasesClient::set_database_inplace_version_upgrade`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetDatabaseInplaceVersionUpgradeOptions {
    pub id: String,
    /// Target major version.
    pub version: Option<String>,
    /// Skip the backup taken before the upgrade.
    pub skip_backup: Option<bool>,
    /// Upgrade is abandoned if it has not started by this time.
    pub expiration_datetime: Option<DateTime<Utc>>,
    pub headers: HashMap<String, String>,
}

impl SetDatabaseInplaceVersionUpgradeOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_skip_backup(mut self, skip_backup: bool) -> Self {
        self.skip_backup = Some(skip_backup);
        self
    }

    pub fn with_expiration_datetime(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration_datetime = Some(expiration);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for SetDatabaseInplaceVersionUpgradeOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .query_bool("skip_backup", self.skip_backup)
            .query_datetime("expiration_datetime", self.expiration_datetime.as_ref())
            .extra_headers(&self.headers)
            .json_body(&VersionBody {
                version: self.version.as_deref(),
            })
    }
}

impl CloudDatabasesClient {
    /// Closes every open connection to the database.
    pub async fn kill_connections(
        &self,
        options: &KillConnectionsOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.kill_connections_with_context(&self.default_context(), options)
            .await
    }

    pub async fn kill_connections_with_context(
        &self,
        ctx: &RequestContext,
        options: &KillConnectionsOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &KILL_CONNECTIONS, Some(options)).await
    }

    /// Upgrades the database to a new major version in place.
    pub async fn set_database_inplace_version_upgrade(
        &self,
        options: &SetDatabaseInplaceVersionUpgradeOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.set_database_inplace_version_upgrade_with_context(&self.default_context(), options)
            .await
    }

    pub async fn set_database_inplace_version_upgrade_with_context(
        &self,
        ctx: &RequestContext,
        options: &SetDatabaseInplaceVersionUpgradeOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &SET_DATABASE_INPLACE_VERSION_UPGRADE, Some(options))
            .await
    }
}
