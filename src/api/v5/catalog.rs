//
//  cloud-databases
//  api/v5/catalog.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployables, regions and deployment details.
//!
//! # Overview
//!
//! - **Deployables**: database types the service can provision, with their
//!   versions and the in-place upgrade paths between them
//! - **Regions**: regions the service runs in
//! - **Deployment info**: details of one provisioned deployment
//! - **Default scaling groups**: resource groups a new deployment of a given
//!   type starts with
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::{GetDefaultScalingGroupsOptions, ListDeployablesOptions};
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn show(client: &CloudDatabasesClient) -> Result<(), cloud_databases::ApiError> {
//!     let deployables = client.list_deployables(&ListDeployablesOptions::new()).await?;
//!     for deployable in deployables.result().map(|r| r.deployables.as_slice()).unwrap_or_default() {
//!         println!("{}: {} versions", deployable.kind, deployable.versions.len());
//!     }
//!
//!     let groups = client
//!         .get_default_scaling_groups(
//!             &GetDefaultScalingGroupsOptions::new("postgresql").with_host_flavor("multitenant"),
//!         )
//!         .await?;
//!     println!("{:?}", groups.result());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scaling::Groups;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

/// A database type that can be deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployable {
    /// Deployment type, e.g. `postgresql`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub versions: Vec<DeployableVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployableVersion {
    pub version: String,

    /// `stable`, `preview` or `deprecated`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub is_preferred: Option<bool>,

    /// Versions this one can be upgraded to.
    #[serde(default)]
    pub transitions: Vec<VersionTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionTransition {
    #[serde(default)]
    pub application: Option<String>,
    /// `restore` or `in-place`.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub skip_backup_supported: Option<bool>,
    #[serde(default)]
    pub from_version: Option<String>,
    #[serde(default)]
    pub to_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDeployablesResponse {
    #[serde(default)]
    pub deployables: Vec<Deployable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRegionsResponse {
    #[serde(default)]
    pub regions: Vec<String>,
}

/// A provisioned deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Platform-specific options such as the key protect key.
    #[serde(default)]
    pub platform_options: Option<serde_json::Value>,

    #[serde(default)]
    pub version: Option<String>,

    /// Admin username per user type.
    #[serde(default)]
    pub admin_usernames: HashMap<String, String>,

    #[serde(default)]
    pub enable_public_endpoints: Option<bool>,

    #[serde(default)]
    pub enable_private_endpoints: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetDeploymentInfoResponse {
    #[serde(default)]
    pub deployment: Option<Deployment>,
}

pub const LIST_DEPLOYABLES: Operation = Operation {
    id: "ListDeployables",
    method: HttpMethod::Get,
    path: "/deployables",
    path_params: &[],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const LIST_REGIONS: Operation = Operation {
    id: "ListRegions",
    method: HttpMethod::Get,
    path: "/regions",
    path_params: &[],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const GET_DEPLOYMENT_INFO: Operation = Operation {
    id: "GetDeploymentInfo",
    method: HttpMethod::Get,
    path: "/deployments/{id}",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const GET_DEFAULT_SCALING_GROUPS: Operation = Operation {
    id: "GetDefaultScalingGroups",
    method: HttpMethod::Get,
    path: "/deployables/{type}/groups",
    path_params: &["type"],
    query_params: &["host_flavor"],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::list_deployables`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDeployablesOptions {
    pub headers: HashMap<String, String>,
}

impl ListDeployablesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for ListDeployablesOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new().extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::list_regions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRegionsOptions {
    pub headers: HashMap<String, String>,
}

impl ListRegionsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for ListRegionsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new().extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::get_deployment_info`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetDeploymentInfoOptions {
    /// Deployment ID.
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl GetDeploymentInfoOptions {
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

impl OperationOptions for GetDeploymentInfoOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::get_default_scaling_groups`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetDefaultScalingGroupsOptions {
    /// Database type, e.g. `postgresql` or `redis`.
    pub deployable_type: String,
    /// Restricts the answer to one host flavor, e.g. `multitenant`.
    pub host_flavor: Option<String>,
    pub headers: HashMap<String, String>,
}

impl GetDefaultScalingGroupsOptions {
    pub fn new(deployable_type: impl Into<String>) -> Self {
        Self {
            deployable_type: deployable_type.into(),
            ..Self::default()
        }
    }

    pub fn with_host_flavor(mut self, host_flavor: impl Into<String>) -> Self {
        self.host_flavor = Some(host_flavor.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for GetDefaultScalingGroupsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("type", &self.deployable_type)
            .query("host_flavor", self.host_flavor.as_deref())
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    /// Lists the database types that can be deployed.
    pub async fn list_deployables(
        &self,
        options: &ListDeployablesOptions,
    ) -> Result<DetailedResponse<ListDeployablesResponse>, ApiError> {
        self.list_deployables_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_deployables_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListDeployablesOptions,
    ) -> Result<DetailedResponse<ListDeployablesResponse>, ApiError> {
        self.execute(ctx, &LIST_DEPLOYABLES, Some(options)).await
    }

    pub async fn list_regions(
        &self,
        options: &ListRegionsOptions,
    ) -> Result<DetailedResponse<ListRegionsResponse>, ApiError> {
        self.list_regions_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_regions_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListRegionsOptions,
    ) -> Result<DetailedResponse<ListRegionsResponse>, ApiError> {
        self.execute(ctx, &LIST_REGIONS, Some(options)).await
    }

    /// Gets the details of one deployment.
    pub async fn get_deployment_info(
        &self,
        options: &GetDeploymentInfoOptions,
    ) -> Result<DetailedResponse<GetDeploymentInfoResponse>, ApiError> {
        self.get_deployment_info_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_deployment_info_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetDeploymentInfoOptions,
    ) -> Result<DetailedResponse<GetDeploymentInfoResponse>, ApiError> {
        self.execute(ctx, &GET_DEPLOYMENT_INFO, Some(options)).await
    }

    /// Gets the default scaling groups for a database type.
    pub async fn get_default_scaling_groups(
        &self,
        options: &GetDefaultScalingGroupsOptions,
    ) -> Result<DetailedResponse<Groups>, ApiError> {
        self.get_default_scaling_groups_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_default_scaling_groups_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetDefaultScalingGroupsOptions,
    ) -> Result<DetailedResponse<Groups>, ApiError> {
        self.execute(ctx, &GET_DEFAULT_SCALING_GROUPS, Some(options)).await
    }
}
