//
//  cloud-databases
//  api/v5/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployment users.
//!
//! Users are scoped by user type: `database` for ordinary database users,
//! `ops_manager` for MongoDB Enterprise Ops Manager users and `redis` for
//! Redis ACL users. Each type takes a slightly different body, modelled by
//! the [`UserPrototype`] variants.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::{CreateDatabaseUserOptions, DatabaseUser, UserPrototype};
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn add_user(client: &CloudDatabasesClient, id: &str) -> Result<(), cloud_databases::ApiError> {
//!     let options = CreateDatabaseUserOptions::new(id, "database").with_user(UserPrototype::Database(
//!         DatabaseUser::new("reporting", "a-long-password-1234"),
//!     ));
//!     let response = client.create_database_user(&options).await?;
//!     println!("task: {:?}", response.result().and_then(|r| r.task.as_ref()));
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

/// An ordinary database user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseUser {
    pub username: String,
    pub password: String,
}

impl DatabaseUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// An Ops Manager user; `role` is `group_read_only` or `group_data_access_admin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsManagerUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A Redis user; `role` is an ACL string such as `+@all -@dangerous`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisDatabaseUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// User to create. The variant's fields are sent flat.
///
/// Request-only: the variants overlap on the wire, so there is no decoding
/// back into this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserPrototype {
    Database(DatabaseUser),
    OpsManager(OpsManagerUser),
    Redis(RedisDatabaseUser),
}

/// Changes to an existing user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Serialize)]
struct UserBody<'a, U: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a U>,
}

pub const CREATE_DATABASE_USER: Operation = Operation {
    id: "CreateDatabaseUser",
    method: HttpMethod::Post,
    path: "/deployments/{id}/users/{user_type}",
    path_params: &["id", "user_type"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const UPDATE_USER: Operation = Operation {
    id: "UpdateUser",
    method: HttpMethod::Patch,
    path: "/deployments/{id}/users/{user_type}/{username}",
    path_params: &["id", "user_type", "username"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: true,
    success: &[202],
    gzip: false,
};

pub const DELETE_DATABASE_USER: Operation = Operation {
    id: "DeleteDatabaseUser",
    method: HttpMethod::Delete,
    path: "/deployments/{id}/users/{user_type}/{username}",
    path_params: &["id", "user_type", "username"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[202],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::create_database_user`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateDatabaseUserOptions {
    /// Deployment ID.
    pub id: String,
    /// `database`, `ops_manager` or `redis`.
    pub user_type: String,
    pub user: Option<UserPrototype>,
    pub headers: HashMap<String, String>,
}

impl CreateDatabaseUserOptions {
    pub fn new(id: impl Into<String>, user_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_type: user_type.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: UserPrototype) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for CreateDatabaseUserOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .path("user_type", &self.user_type)
            .extra_headers(&self.headers)
            .json_body(&UserBody {
                user: self.user.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::update_user`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserOptions {
    pub id: String,
    pub user_type: String,
    pub username: String,
    pub user: Option<UserUpdate>,
    pub headers: HashMap<String, String>,
}

impl UpdateUserOptions {
    pub fn new(
        id: impl Into<String>,
        user_type: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_type: user_type.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: UserUpdate) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for UpdateUserOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        RequestParams::new()
            .path("id", &self.id)
            .path("user_type", &self.user_type)
            .path("username", &self.username)
            .extra_headers(&self.headers)
            .json_body(&UserBody {
                user: self.user.as_ref(),
            })
    }
}

/// Options for [`CloudDatabasesClient::delete_database_user`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteDatabaseUserOptions {
    pub id: String,
    pub user_type: String,
    pub username: String,
    pub headers: HashMap<String, String>,
}

impl DeleteDatabaseUserOptions {
    pub fn new(
        id: impl Into<String>,
        user_type: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_type: user_type.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl OperationOptions for DeleteDatabaseUserOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .path("user_type", &self.user_type)
            .path("username", &self.username)
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    /// Creates a user. Answers with the task doing the work.
    pub async fn create_database_user(
        &self,
        options: &CreateDatabaseUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.create_database_user_with_context(&self.default_context(), options)
            .await
    }

    pub async fn create_database_user_with_context(
        &self,
        ctx: &RequestContext,
        options: &CreateDatabaseUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &CREATE_DATABASE_USER, Some(options)).await
    }

    /// Changes a user's password or role.
    pub async fn update_user(
        &self,
        options: &UpdateUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.update_user_with_context(&self.default_context(), options)
            .await
    }

    pub async fn update_user_with_context(
        &self,
        ctx: &RequestContext,
        options: &UpdateUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &UPDATE_USER, Some(options)).await
    }

    pub async fn delete_database_user(
        &self,
        options: &DeleteDatabaseUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.delete_database_user_with_context(&self.default_context(), options)
            .await
    }

    pub async fn delete_database_user_with_context(
        &self,
        ctx: &RequestContext,
        options: &DeleteDatabaseUserOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &DELETE_DATABASE_USER, Some(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_variants_serialize_flat() {
        let params = CreateDatabaseUserOptions::new("dep", "redis")
            .with_user(UserPrototype::Redis(RedisDatabaseUser {
                username: "cache".to_string(),
                password: "pw".to_string(),
                role: Some("-@all +@read".to_string()),
            }))
            .params()
            .unwrap();
        assert_eq!(
            params.body(),
            Some(&json!({"user": {"username": "cache", "password": "pw", "role": "-@all +@read"}}))
        );
    }

    #[test]
    fn test_ops_manager_user_keeps_role() {
        let params = CreateDatabaseUserOptions::new("dep", "ops_manager")
            .with_user(UserPrototype::OpsManager(OpsManagerUser {
                username: "ops".to_string(),
                password: "pw".to_string(),
                role: Some("group_read_only".to_string()),
            }))
            .params()
            .unwrap();
        assert_eq!(
            params.body(),
            Some(&json!({"user": {"username": "ops", "password": "pw", "role": "group_read_only"}}))
        );
    }

    #[test]
    fn test_missing_user_sends_no_body() {
        let params = CreateDatabaseUserOptions::new("dep", "database").params().unwrap();
        assert!(params.body().is_none());
    }

    #[test]
    fn test_update_binds_all_slots() {
        let params = UpdateUserOptions::new("dep", "database", "alice")
            .with_user(UserUpdate {
                password: Some("new-password".to_string()),
                role: None,
            })
            .params()
            .unwrap();
        assert_eq!(params.path_value("username"), Some("alice"));
        assert_eq!(params.body(), Some(&json!({"user": {"password": "new-password"}})));
    }
}
