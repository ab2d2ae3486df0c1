//
//  cloud-databases
//  api/v5/capability.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Capability queries.
//!
//! A capability answers "what is possible" for a deployment or a
//! hypothetical one: available autoscaling settings, encryption, endpoints,
//! flavors, locations, point-in-time recovery, remotes, versions and so on.
//! The shape of the answer depends on the capability asked for, so
//! [`Capability`] keeps its entries as raw JSON.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

/// Capability details keyed by capability name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(flatten)]
    pub entries: BTreeMap<String, Value>,
}

impl Capability {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResponse {
    #[serde(default)]
    pub capability: Capability,
}

/// Describes the deployment a capability is asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDeployment {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityBackup {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityReplica {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Extra inputs some capabilities take.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_flavor: Option<String>,
}

#[derive(Serialize)]
struct CreateCapabilityBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment: Option<&'a CapabilityDeployment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<&'a CapabilityBackup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replica: Option<&'a CapabilityReplica>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a CapabilityOptions>,
}

pub const CREATE_CAPABILITY: Operation = Operation {
    id: "CreateCapability",
    method: HttpMethod::Post,
    path: "/capability/{capability_id}",
    path_params: &["capability_id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[200],
    gzip: false,
};

pub const GET_DEPLOYMENT_CAPABILITY: Operation = Operation {
    id: "GetDeploymentCapability",
    method: HttpMethod::Get,
    path: "/deployments/{id}/capability/{capability_id}",
    path_params: &["id", "capability_id"],
    query_params: &["target_platform", "target_location", "host_flavor"],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::create_capability`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCapabilityOptions {
    /// Capability name, e.g. `versions` or `flavors`.
    pub capability_id: String,
    pub deployment: Option<CapabilityDeployment>,
    pub backup: Option<CapabilityBackup>,
    pub replica: Option<CapabilityReplica>,
    pub options: Option<CapabilityOptions>,
    pub headers: HashMap<String, String>,
}

impl CreateCapabilityOptions {
    pub fn new(capability_id: impl Into<String>) -> Self {
        Self {
            capability_id: capability_id.into(),
            ..Self::default()
        }
    }

    pub fn with_deployment(mut self, deployment: CapabilityDeployment) -> Self {
        self.deployment = Some(deployment);
        self
    }

    pub fn with_backup(mut self, backup: CapabilityBackup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn with_replica(mut self, replica: CapabilityReplica) -> Self {
        self.replica = Some(replica);
        self
    }

    pub fn with_options(mut self, options: CapabilityOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for CreateCapabilityOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("capability_id", &self.capability_id)
            .extra_headers(&self.headers)
            .json_body(&CreateCapabilityBody {
                deployment: self.deployment.as_ref(),
                backup: self.backup.as_ref(),
                replica: self.replica.as_ref(),
                options: self.options.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::get_deployment_capability`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetDeploymentCapabilityOptions {
    pub id: String,
    pub capability_id: String,
    pub target_platform: Option<String>,
    pub target_location: Option<String>,
    pub host_flavor: Option<String>,
    pub headers: HashMap<String, String>,
}

impl GetDeploymentCapabilityOptions {
    pub fn new(id: impl Into<String>, capability_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capability_id: capability_id.into(),
            ..Self::default()
        }
    }

    pub fn with_target_platform(mut self, platform: impl Into<String>) -> Self {
        self.target_platform = Some(platform.into());
        self
    }

    pub fn with_target_location(mut self, location: impl Into<String>) -> Self {
        self.target_location = Some(location.into());
        self
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

impl OperationOptions for GetDeploymentCapabilityOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("capability_id", &self.capability_id)
            .query("target_platform", self.target_platform.as_deref())
            .query("target_location", self.target_location.as_deref())
            .query("host_flavor", self.host_flavor.as_deref())
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    /// Asks what a capability offers for a described deployment.
    pub async fn create_capability(
        &self,
        options: &CreateCapabilityOptions,
    ) -> Result<DetailedResponse<CapabilityResponse>, ApiError> {
        self.create_capability_with_context(&self.default_context(), options)
            .await
    }

    pub async fn create_capability_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateCapabilityOptions,
    ) -> Result<DetailedResponse<CapabilityResponse>, ApiError> {
        self.execute(ctx, &CREATE_CAPABILITY, Some(options)).await
    }

    /// Asks what a capability offers for an existing deployment.
    pub async fn get_deployment_capability(
        &self,
        options: &GetDeploymentCapabilityOptions,
    ) -> Result<DetailedResponse<CapabilityResponse>, ApiError> {
        self.get_deployment_capability_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_deployment_capability_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetDeploymentCapabilityOptions,
    ) -> Result<DetailedResponse<CapabilityResponse>, ApiError> {
        self.execute(ctx, &GET_DEPLOYMENT_CAPABILITY, Some(options))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_capability_body() {
        let params = CreateCapabilityOptions::new("versions")
            .with_deployment(CapabilityDeployment {
                kind: Some("postgresql".to_string()),
                version: Some("15".to_string()),
                platform: Some("classic".to_string()),
                location: Some("us-south".to_string()),
            })
            .params()
            .unwrap();
        assert_eq!(
            params.body(),
            Some(&json!({
                "deployment": {"type": "postgresql", "version": "15", "platform": "classic", "location": "us-south"}
            }))
        );
    }

    #[test]
    fn test_deployment_capability_queries_in_order() {
        let params = GetDeploymentCapabilityOptions::new("dep", "flavors")
            .with_host_flavor("b3c.4x16.encrypted")
            .with_target_platform("satellite")
            .params()
            .unwrap();
        assert_eq!(
            params.query_pairs(),
            &[
                ("target_platform", "satellite".to_string()),
                ("host_flavor", "b3c.4x16.encrypted".to_string()),
            ]
        );
    }

    #[test]
    fn test_capability_keeps_raw_entries() {
        let response: CapabilityResponse = serde_json::from_str(
            r#"{"capability":{"versions":[{"version":"16","status":"stable"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.capability.get("versions").unwrap()[0]["version"], "16");
    }
}
