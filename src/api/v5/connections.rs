//
//  cloud-databases
//  api/v5/connections.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Connection strings.
//!
//! A connection document has one entry per protocol the deployment speaks
//! (`postgres`, `rediss`, `mongodb`, `amqps`, `cli`, ...). Entries are kept
//! in a map keyed by protocol since the set depends on the database type.
//!
//! [`CloudDatabasesClient::complete_connection`] fills in the password so
//! the composed URIs can be used directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::GetConnectionOptions;
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn uri(client: &CloudDatabasesClient, id: &str) -> Result<(), cloud_databases::ApiError> {
//!     let options = GetConnectionOptions::new(id, "database", "admin", "public");
//!     let response = client.get_connection(&options).await?;
//!     if let Some(entry) = response.result().and_then(|r| r.connection.endpoints.get("postgres")) {
//!         println!("{:?}", entry.composed);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionHost {
    pub hostname: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAuthentication {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCertificate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub certificate_base64: Option<String>,
}

/// Connection details for one protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEndpoint {
    /// `uri` for network protocols, `cli` for the command line entry.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Ready-to-use connection strings.
    #[serde(default)]
    pub composed: Vec<String>,

    #[serde(default)]
    pub scheme: Option<String>,

    #[serde(default)]
    pub hosts: Vec<ConnectionHost>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub query_options: Option<serde_json::Value>,

    #[serde(default)]
    pub authentication: Option<ConnectionAuthentication>,

    #[serde(default)]
    pub certificate: Option<ConnectionCertificate>,

    #[serde(default)]
    pub database: Option<String>,

    /// CLI binary name, for the `cli` entry.
    #[serde(default)]
    pub bin: Option<String>,

    #[serde(default)]
    pub arguments: Vec<Vec<String>>,

    #[serde(default)]
    pub environment: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(flatten)]
    pub endpoints: BTreeMap<String, ConnectionEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionResponse {
    #[serde(default)]
    pub connection: Connection,
}

#[derive(Serialize)]
struct CompleteConnectionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

pub const GET_CONNECTION: Operation = Operation {
    id: "GetConnection",
    method: HttpMethod::Get,
    path: "/deployments/{id}/users/{user_type}/{user_id}/connections/{endpoint_type}",
    path_params: &["id", "user_type", "user_id", "endpoint_type"],
    query_params: &["certificate_root"],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const COMPLETE_CONNECTION: Operation = Operation {
    id: "CompleteConnection",
    method: HttpMethod::Post,
    path: "/deployments/{id}/users/{user_type}/{user_id}/connections/{endpoint_type}",
    path_params: &["id", "user_type", "user_id", "endpoint_type"],
    query_params: &["certificate_root"],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[200],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::get_connection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetConnectionOptions {
    pub id: String,
    pub user_type: String,
    pub user_id: String,
    /// `public` or `private`.
    pub endpoint_type: String,
    /// Path where the root certificate is stored, substituted into the
    /// composed connection strings.
    pub certificate_root: Option<String>,
    pub headers: HashMap<String, String>,
}

impl GetConnectionOptions {
    pub fn new(
        id: impl Into<String>,
        user_type: impl Into<String>,
        user_id: impl Into<String>,
        endpoint_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_type: user_type.into(),
            user_id: user_id.into(),
            endpoint_type: endpoint_type.into(),
            ..Self::default()
        }
    }

    pub fn with_certificate_root(mut self, certificate_root: impl Into<String>) -> Self {
        self.certificate_root = Some(certificate_root.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for GetConnectionOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("user_type", &self.user_type)
            .path("user_id", &self.user_id)
            .path("endpoint_type", &self.endpoint_type)
            .query("certificate_root", self.certificate_root.as_deref())
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::complete_connection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompleteConnectionOptions {
    pub id: String,
    pub user_type: String,
    pub user_id: String,
    pub endpoint_type: String,
    /// Password filled into the connection strings.
    pub password: Option<String>,
    pub certificate_root: Option<String>,
    pub headers: HashMap<String, String>,
}

impl CompleteConnectionOptions {
    pub fn new(
        id: impl Into<String>,
        user_type: impl Into<String>,
        user_id: impl Into<String>,
        endpoint_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_type: user_type.into(),
            user_id: user_id.into(),
            endpoint_type: endpoint_type.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_certificate_root(mut self, certificate_root: impl Into<String>) -> Self {
        self.certificate_root = Some(certificate_root.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for CompleteConnectionOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .path("user_type", &self.user_type)
            .path("user_id", &self.user_id)
            .path("endpoint_type", &self.endpoint_type)
            .query("certificate_root", self.certificate_root.as_deref())
            .extra_headers(&self.headers)
            .json_body(&CompleteConnectionBody {
                password: self.password.as_deref(),
            })
    }
}

impl CloudDatabasesClient {
    /// Gets connection strings for a user, without the password.
    pub async fn get_connection(
        &self,
        options: &GetConnectionOptions,
    ) -> Result<DetailedResponse<ConnectionResponse>, ApiError> {
        self.get_connection_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_connection_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetConnectionOptions,
    ) -> Result<DetailedResponse<ConnectionResponse>, ApiError> {
        self.execute(ctx, &GET_CONNECTION, Some(options)).await
    }

    /// Gets connection strings with the password filled in.
    pub async fn complete_connection(
        &self,
        options: &CompleteConnectionOptions,
    ) -> Result<DetailedResponse<ConnectionResponse>, ApiError> {
        self.complete_connection_with_context(&self.default_context(), options)
            .await
    }

    pub async fn complete_connection_with_context(
        &self,
        ctx: &RequestContext,
        options: &CompleteConnectionOptions,
    ) -> Result<DetailedResponse<ConnectionResponse>, ApiError> {
        self.execute(ctx, &COMPLETE_CONNECTION, Some(options)).await
    }
}
