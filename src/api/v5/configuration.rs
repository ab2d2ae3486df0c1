//
//  cloud-databases
//  api/v5/configuration.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Database configuration.
//!
//! Each database type accepts its own set of settings. Only the fields that
//! are set are sent; the service keeps its current value for the rest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tasks::TaskResponse;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostgresConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadlock_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_io_concurrency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_connections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_disconnections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_min_duration_statement: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_prepared_transactions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replication_slots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wal_senders: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_buffers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronous_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_keepalives_idle: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wal_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_mem: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedisConfiguration {
    #[serde(rename = "maxmemory", skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<i64>,
    #[serde(rename = "maxmemory-policy", skip_serializing_if = "Option::is_none")]
    pub max_memory_policy: Option<String>,
    #[serde(rename = "appendonly", skip_serializing_if = "Option::is_none")]
    pub append_only: Option<String>,
    #[serde(rename = "maxmemory-samples", skip_serializing_if = "Option::is_none")]
    pub max_memory_samples: Option<i64>,
    #[serde(rename = "stop-writes-on-bgsave-error", skip_serializing_if = "Option::is_none")]
    pub stop_writes_on_bgsave_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MySqlConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_authentication_plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innodb_buffer_pool_size_percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innodb_flush_log_at_trx_commit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innodb_log_buffer_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_allowed_packet: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_max_binlog_age_sec: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_read_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_write_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RabbitMqConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_undefined_queues: Option<bool>,
}

/// New configuration for a deployment. The variant's fields are sent flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Configuration {
    PostgreSql(PostgresConfiguration),
    Redis(RedisConfiguration),
    MySql(MySqlConfiguration),
    RabbitMq(RabbitMqConfiguration),
}

#[derive(Serialize)]
struct ConfigurationBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration: Option<&'a Configuration>,
}

pub const UPDATE_DATABASE_CONFIGURATION: Operation = Operation {
    id: "UpdateDatabaseConfiguration",
    method: HttpMethod::Patch,
    path: "/deployments/{id}/configuration",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::update_database_configuration`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDatabaseConfigurationOptions {
    pub id: String,
    pub configuration: Option<Configuration>,
    pub headers: HashMap<String, String>,
}

impl UpdateDatabaseConfigurationOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for UpdateDatabaseConfigurationOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers)
            .json_body(&ConfigurationBody {
                configuration: self.configuration.as_ref(),
            })
    }
}

impl CloudDatabasesClient {
    /// Changes database settings. Some settings restart the database.
    pub async fn update_database_configuration(
        &self,
        options: &UpdateDatabaseConfigurationOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.update_database_configuration_with_context(&self.default_context(), options)
            .await
    }

    pub async fn update_database_configuration_with_context(
        &self,
        ctx: &RequestContext,
        options: &UpdateDatabaseConfigurationOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &UPDATE_DATABASE_CONFIGURATION, Some(options))
            .await
    }
}
