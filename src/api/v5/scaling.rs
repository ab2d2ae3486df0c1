//
//  cloud-databases
//  api/v5/scaling.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Scaling groups and autoscaling.
//!
//! A deployment's resources are organized in groups (usually one, `member`).
//! Each group reports its member count, memory, CPU and disk allocations
//! along with the allowed range and step size for changes.
//!
//! Autoscaling conditions are set per resource. The body of a
//! set-autoscaling call is keyed by the resource it targets:
//!
//! ```json
//! {"autoscaling": {"disk": {"scalers": {...}, "rate": {...}}}}
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::{
//!     AutoscalingRate, AutoscalingSet, DiskAutoscaling, SetAutoscalingConditionsOptions,
//! };
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn grow_disk(client: &CloudDatabasesClient, id: &str) -> Result<(), cloud_databases::ApiError> {
//!     let disk = DiskAutoscaling {
//!         rate: Some(AutoscalingRate {
//!             increase_percent: Some(20.0),
//!             period_seconds: Some(900),
//!             limit_mb_per_member: Some(3_670_016.0),
//!             units: Some("mb".to_string()),
//!             ..AutoscalingRate::default()
//!         }),
//!         ..DiskAutoscaling::default()
//!     };
//!     let options = SetAutoscalingConditionsOptions::new(id, "member")
//!         .with_autoscaling(AutoscalingSet::Disk(disk));
//!     client.set_autoscaling_conditions(&options).await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tasks::TaskResponse;
use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

/// Allocation and limits of one resource in a group.
///
/// Member and CPU resources report counts; memory and disk report
/// megabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupResource {
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub allocation_count: Option<i64>,
    #[serde(default)]
    pub minimum_count: Option<i64>,
    #[serde(default)]
    pub maximum_count: Option<i64>,
    #[serde(default)]
    pub step_size_count: Option<i64>,
    #[serde(default)]
    pub allocation_mb: Option<i64>,
    #[serde(default)]
    pub minimum_mb: Option<i64>,
    #[serde(default)]
    pub maximum_mb: Option<i64>,
    #[serde(default)]
    pub step_size_mb: Option<i64>,
    #[serde(default)]
    pub is_adjustable: Option<bool>,
    #[serde(default)]
    pub is_optional: Option<bool>,
    #[serde(default)]
    pub can_scale_down: Option<bool>,
    #[serde(default)]
    pub cpu_enforcement_ratio_ceiling_mb: Option<i64>,
    #[serde(default)]
    pub cpu_enforcement_ratio_mb: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupHostFlavor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hosting_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID, e.g. `member`.
    pub id: String,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub members: Option<GroupResource>,
    #[serde(default)]
    pub memory: Option<GroupResource>,
    #[serde(default)]
    pub cpu: Option<GroupResource>,
    #[serde(default)]
    pub disk: Option<GroupResource>,
    #[serde(default)]
    pub host_flavor: Option<GroupHostFlavor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Groups {
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Requested allocation for a group; unset resources are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupScaling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<ScalingCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<ScalingMegabytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<ScalingCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<ScalingMegabytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_flavor: Option<ScalingHostFlavor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingCount {
    pub allocation_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingMegabytes {
    pub allocation_mb: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingHostFlavor {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space_less_than_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoUtilizationScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Window such as `30m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingScalers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityScaler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_utilization: Option<IoUtilizationScaler>,
}

/// How fast and how far autoscaling may grow a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingRate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_mb_per_member: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_count_per_member: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskAutoscaling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalers: Option<AutoscalingScalers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<AutoscalingRate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAutoscaling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalers: Option<AutoscalingScalers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<AutoscalingRate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuAutoscaling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalers: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<AutoscalingRate>,
}

/// Current autoscaling conditions of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingConditions {
    #[serde(default)]
    pub disk: Option<DiskAutoscaling>,
    #[serde(default)]
    pub memory: Option<MemoryAutoscaling>,
    #[serde(default)]
    pub cpu: Option<CpuAutoscaling>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingGroup {
    #[serde(default)]
    pub autoscaling: AutoscalingConditions,
}

/// Autoscaling conditions for one resource, keyed by that resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoscalingSet {
    Disk(DiskAutoscaling),
    Memory(MemoryAutoscaling),
    Cpu(CpuAutoscaling),
}

#[derive(Serialize)]
struct GroupBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a GroupScaling>,
}

#[derive(Serialize)]
struct AutoscalingBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    autoscaling: Option<&'a AutoscalingSet>,
}

pub const LIST_DEPLOYMENT_SCALING_GROUPS: Operation = Operation {
    id: "ListDeploymentScalingGroups",
    method: HttpMethod::Get,
    path: "/deployments/{id}/groups",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const SET_DEPLOYMENT_SCALING_GROUP: Operation = Operation {
    id: "SetDeploymentScalingGroup",
    method: HttpMethod::Patch,
    path: "/deployments/{id}/groups/{group_id}",
    path_params: &["id", "group_id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const GET_AUTOSCALING_CONDITIONS: Operation = Operation {
    id: "GetAutoscalingConditions",
    method: HttpMethod::Get,
    path: "/deployments/{id}/groups/{group_id}/autoscaling",
    path_params: &["id", "group_id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const SET_AUTOSCALING_CONDITIONS: Operation = Operation {
    id: "SetAutoscalingConditions",
    method: HttpMethod::Patch,
    path: "/deployments/{id}/groups/{group_id}/autoscaling",
    path_params: &["id", "group_id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::list_deployment_scaling_groups`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDeploymentScalingGroupsOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl ListDeploymentScalingGroupsOptions {
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

impl OperationOptions for ListDeploymentScalingGroupsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::set_deployment_scaling_group`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetDeploymentScalingGroupOptions {
    pub id: String,
    pub group_id: String,
    pub group: Option<GroupScaling>,
    pub headers: HashMap<String, String>,
}

impl SetDeploymentScalingGroupOptions {
    pub fn new(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: GroupScaling) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for SetDeploymentScalingGroupOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .path("group_id", &self.group_id)
            .extra_headers(&self.headers)
            .json_body(&GroupBody {
                group: self.group.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::get_autoscaling_conditions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetAutoscalingConditionsOptions {
    pub id: String,
    pub group_id: String,
    pub headers: HashMap<String, String>,
}

impl GetAutoscalingConditionsOptions {
    pub fn new(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for GetAutoscalingConditionsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("group_id", &self.group_id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::set_autoscaling_conditions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetAutoscalingConditionsOptions {
    pub id: String,
    pub group_id: String,
    pub autoscaling: Option<AutoscalingSet>,
    pub headers: HashMap<String, String>,
}

impl SetAutoscalingConditionsOptions {
    pub fn new(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            ..Self::default()
        }
    }

    pub fn with_autoscaling(mut self, autoscaling: AutoscalingSet) -> Self {
        self.autoscaling = Some(autoscaling);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for SetAutoscalingConditionsOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .path("group_id", &self.group_id)
            .extra_headers(&self.headers)
            .json_body(&AutoscalingBody {
                autoscaling: self.autoscaling.as_ref(),
            })
    }
}

impl CloudDatabasesClient {
    /// Lists the scaling groups of a deployment with their current
    /// allocations.
    pub async fn list_deployment_scaling_groups(
        &self,
        options: &ListDeploymentScalingGroupsOptions,
    ) -> Result<DetailedResponse<Groups>, ApiError> {
        self.list_deployment_scaling_groups_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_deployment_scaling_groups_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListDeploymentScalingGroupsOptions,
    ) -> Result<DetailedResponse<Groups>, ApiError> {
        self.execute(ctx, &LIST_DEPLOYMENT_SCALING_GROUPS, Some(options))
            .await
    }

    /// Changes the resources allocated to a group.
    pub async fn set_deployment_scaling_group(
        &self,
        options: &SetDeploymentScalingGroupOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.set_deployment_scaling_group_with_context(&self.default_context(), options)
            .await
    }

    pub async fn set_deployment_scaling_group_with_context(
        &self,
        ctx: &RequestContext,
        options: &SetDeploymentScalingGroupOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &SET_DEPLOYMENT_SCALING_GROUP, Some(options))
            .await
    }

    pub async fn get_autoscaling_conditions(
        &self,
        options: &GetAutoscalingConditionsOptions,
    ) -> Result<DetailedResponse<AutoscalingGroup>, ApiError> {
        self.get_autoscaling_conditions_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_autoscaling_conditions_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetAutoscalingConditionsOptions,
    ) -> Result<DetailedResponse<AutoscalingGroup>, ApiError> {
        self.execute(ctx, &GET_AUTOSCALING_CONDITIONS, Some(options))
            .await
    }

    pub async fn set_autoscaling_conditions(
        &self,
        options: &SetAutoscalingConditionsOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.set_autoscaling_conditions_with_context(&self.default_context(), options)
            .await
    }

    pub async fn set_autoscaling_conditions_with_context(
        &self,
        ctx: &RequestContext,
        options: &SetAutoscalingConditionsOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &SET_AUTOSCALING_CONDITIONS, Some(options))
            .await
    }
}
