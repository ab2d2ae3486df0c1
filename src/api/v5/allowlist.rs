//
//  cloud-databases
//  api/v5/allowlist.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! IP allowlists.
//!
//! Replacing the whole allowlist is guarded by optimistic concurrency: read
//! the list, take the `ETag` header from the envelope and send it back as
//! `If-Match`. The service rejects the write with `412` if the list changed
//! in between.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::{AllowlistEntry, GetAllowlistOptions, SetAllowlistOptions};
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn replace(client: &CloudDatabasesClient, id: &str) -> Result<(), cloud_databases::ApiError> {
//!     let current = client.get_allowlist(&GetAllowlistOptions::new(id)).await?;
//!     let etag = current.envelope().header("etag").unwrap_or_default().to_string();
//!
//!     let options = SetAllowlistOptions::new(id, etag)
//!         .with_entry(AllowlistEntry::new("10.0.0.0/8", "office"));
//!     client.set_allowlist(&options).await?;
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

/// An address or CIDR range allowed to connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AllowlistEntry {
    pub fn new(address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            description: Some(description.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allowlist {
    #[serde(default)]
    pub ip_addresses: Vec<AllowlistEntry>,
}

#[derive(Serialize)]
struct AllowlistBody<'a> {
    ip_addresses: &'a [AllowlistEntry],
}

#[derive(Serialize)]
struct EntryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_address: Option<&'a AllowlistEntry>,
}

pub const GET_ALLOWLIST: Operation = Operation {
    id: "GetAllowlist",
    method: HttpMethod::Get,
    path: "/deployments/{id}/allowlists/ip_addresses",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const SET_ALLOWLIST: Operation = Operation {
    id: "SetAllowlist",
    method: HttpMethod::Put,
    path: "/deployments/{id}/allowlists/ip_addresses",
    path_params: &["id"],
    query_params: &[],
    header_params: &["If-Match"],
    required_headers: &["If-Match"],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const ADD_ALLOWLIST_ENTRY: Operation = Operation {
    id: "AddAllowlistEntry",
    method: HttpMethod::Post,
    path: "/deployments/{id}/allowlists/ip_addresses",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const DELETE_ALLOWLIST_ENTRY: Operation = Operation {
    id: "DeleteAllowlistEntry",
    method: HttpMethod::Delete,
    path: "/deployments/{id}/allowlists/ip_addresses/{ipaddress}",
    path_params: &["id", "ipaddress"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::get_allowlist`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetAllowlistOptions {
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl GetAllowlistOptions {
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

impl OperationOptions for GetAllowlistOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::set_allowlist`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetAllowlistOptions {
    pub id: String,
    /// New allowlist; an empty list removes every entry.
    pub ip_addresses: Vec<AllowlistEntry>,
    /// `ETag` of the allowlist being replaced.
    pub if_match: String,
    pub headers: HashMap<String, String>,
}

impl SetAllowlistOptions {
    pub fn new(id: impl Into<String>, if_match: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            if_match: if_match.into(),
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, entry: AllowlistEntry) -> Self {
        self.ip_addresses.push(entry);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for SetAllowlistOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .header("If-Match", Some(self.if_match.as_str()))
            .extra_headers(&self.headers)
            .json_body(&AllowlistBody {
                ip_addresses: &self.ip_addresses,
            })
    }
}

/// Options for [`CloudDatabasesClient::add_allowlist_entry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddAllowlistEntryOptions {
    pub id: String,
    pub ip_address: Option<AllowlistEntry>,
    pub headers: HashMap<String, String>,
}

impl AddAllowlistEntryOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, entry: AllowlistEntry) -> Self {
        self.ip_address = Some(entry);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for AddAllowlistEntryOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers)
            .json_body(&EntryBody {
                ip_address: self.ip_address.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::delete_allowlist_entry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteAllowlistEntryOptions {
    pub id: String,
    /// Address or CIDR range to remove.
    pub ipaddress: String,
    pub headers: HashMap<String, String>,
}

impl DeleteAllowlistEntryOptions {
    pub fn new(id: impl Into<String>, ipaddress: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ipaddress: ipaddress.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for DeleteAllowlistEntryOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("ipaddress", &self.ipaddress)
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    pub async fn get_allowlist(
        &self,
        options: &GetAllowlistOptions,
    ) -> Result<DetailedResponse<Allowlist>, ApiError> {
        self.get_allowlist_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_allowlist_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetAllowlistOptions,
    ) -> Result<DetailedResponse<Allowlist>, ApiError> {
        self.execute(ctx, &GET_ALLOWLIST, Some(options)).await
    }

    /// Replaces the allowlist. Requires the current `ETag` as `If-Match`.
    pub async fn set_allowlist(
        &self,
        options: &SetAllowlistOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.set_allowlist_with_context(&self.default_context(), options)
            .await
    }

    pub async fn set_allowlist_with_context(
        &self,
        ctx: &RequestContext,
        options: &SetAllowlistOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &SET_ALLOWLIST, Some(options)).await
    }

    pub async fn add_allowlist_entry(
        &self,
        options: &AddAllowlistEntryOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.add_allowlist_entry_with_context(&self.default_context(), options)
            .await
    }

    pub async fn add_allowlist_entry_with_context(
        &self,
        ctx: &RequestContext,
        options: &AddAllowlistEntryOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &ADD_ALLOWLIST_ENTRY, Some(options)).await
    }

    pub async fn delete_allowlist_entry(
        &self,
        options: &DeleteAllowlistEntryOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.delete_allowlist_entry_with_context(&self.default_context(), options)
            .await
    }

    pub async fn delete_allowlist_entry_with_context(
        &self,
        ctx: &RequestContext,
        options: &DeleteAllowlistEntryOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &DELETE_ALLOWLIST_ENTRY, Some(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use crate::api::operation::validate_request;
    use serde_json::json;

    #[test]
    fn test_set_allowlist_requires_if_match() {
        let params = SetAllowlistOptions::new("dep", "").params().unwrap();
        let err = validate_request(&SET_ALLOWLIST, Some(&params)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let params = SetAllowlistOptions::new("dep", "\"abc\"").params().unwrap();
        assert!(validate_request(&SET_ALLOWLIST, Some(&params)).is_ok());
        assert_eq!(params.header_value("if-match"), Some("\"abc\""));
    }

    #[test]
    fn test_empty_allowlist_is_still_sent() {
        let params = SetAllowlistOptions::new("dep", "etag").params().unwrap();
        assert_eq!(params.body(), Some(&json!({"ip_addresses": []})));
    }

    #[test]
    fn test_add_entry_body() {
        let params = AddAllowlistEntryOptions::new("dep")
            .with_entry(AllowlistEntry::new("192.168.0.1", "vpn"))
            .params()
            .unwrap();
        assert_eq!(
            params.body(),
            Some(&json!({"ip_address": {"address": "192.168.0.1", "description": "vpn"}}))
        );
    }
}
