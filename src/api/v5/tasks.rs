//
//  cloud-databases
//  api/v5/tasks.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployment tasks.
//!
//! Most write operations are asynchronous: the service answers `202
//! Accepted` with a [`Task`] that can be polled with
//! [`CloudDatabasesClient::get_task`] until it reaches `completed` or
//! `failed`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use cloud_databases::api::v5::{GetTaskOptions, TaskStatus};
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn wait_for(client: &CloudDatabasesClient, task_id: &str) -> Result<(), cloud_databases::ApiError> {
//!     loop {
//!         let response = client.get_task(&GetTaskOptions::new(task_id)).await?;
//!         let status = response.result().and_then(|r| r.task.as_ref()).map(|t| t.status());
//!         if matches!(status, Some(TaskStatus::Completed | TaskStatus::Failed)) {
//!             return Ok(());
//!         }
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!     }
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::client::CloudDatabasesClient;
use crate::api::common::{ApiError, DetailedResponse};
use crate::api::context::RequestContext;
use crate::api::operation::{Operation, OperationOptions, RequestParams};
use crate::api::transport::HttpMethod;

/// A long-running deployment task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    /// Human-readable description, e.g. `Creating user.`.
    #[serde(default)]
    pub description: Option<String>,

    /// One of `running`, `completed`, `failed` or `queued`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub deployment_id: Option<String>,

    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub progress_percent: Option<i64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parsed task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Unknown,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        match self.status.as_deref() {
            Some("queued") => TaskStatus::Queued,
            Some("running") => TaskStatus::Running,
            Some("completed") => TaskStatus::Completed,
            Some("failed") => TaskStatus::Failed,
            _ => TaskStatus::Unknown,
        }
    }
}

/// Response of every operation that starts a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub task: Option<Task>,
}

/// Tasks of one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tasks {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

pub const LIST_DEPLOYMENT_TASKS: Operation = Operation {
    id: "ListDeploymentTasks",
    method: HttpMethod::Get,
    path: "/deployments/{id}/tasks",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

pub const GET_TASK: Operation = Operation {
    id: "GetTask",
    method: HttpMethod::Get,
    path: "/tasks/{id}",
    path_params: &["id"],
    query_params: &[],
    header_params: &[],
    required_headers: &[],
    json_body: false,
    success: &[200],
    gzip: false,
};

/// Options for [`CloudDatabasesClient::list_deployment_tasks`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDeploymentTasksOptions {
    /// Deployment ID.
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl ListDeploymentTasksOptions {
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

impl OperationOptions for ListDeploymentTasksOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

/// Options for [`CloudDatabasesClient::get_task`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetTaskOptions {
    /// Task ID.
    pub id: String,
    pub headers: HashMap<String, String>,
}

impl GetTaskOptions {
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

impl OperationOptions for GetTaskOptions {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(RequestParams::new()
            .path("id", &self.id)
            .extra_headers(&self.headers))
    }
}

impl CloudDatabasesClient {
    /// Lists the tasks of a deployment.
    pub async fn list_deployment_tasks(
        &self,
        options: &ListDeploymentTasksOptions,
    ) -> Result<DetailedResponse<Tasks>, ApiError> {
        self.list_deployment_tasks_with_context(&self.default_context(), options)
            .await
    }

    pub async fn list_deployment_tasks_with_context(
        &self,
        ctx: &RequestContext,
        options: &ListDeploymentTasksOptions,
    ) -> Result<DetailedResponse<Tasks>, ApiError> {
        self.execute(ctx, &LIST_DEPLOYMENT_TASKS, Some(options)).await
    }

    /// Gets a task by ID.
    pub async fn get_task(
        &self,
        options: &GetTaskOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.get_task_with_context(&self.default_context(), options)
            .await
    }

    pub async fn get_task_with_context(
        &self,
        ctx: &RequestContext,
        options: &GetTaskOptions,
    ) -> Result<DetailedResponse<TaskResponse>, ApiError> {
        self.execute(ctx, &GET_TASK, Some(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialization() {
        let json = r#"{
            "task": {
                "id": "crn:v1:task:1",
                "description": "Creating user.",
                "status": "running",
                "deployment_id": "crn:v1:deployment:1",
                "progress_percent": 40,
                "created_at": "2024-05-01T12:00:00Z"
            }
        }"#;
        let response: TaskResponse = serde_json::from_str(json).unwrap();
        let task = response.task.unwrap();
        assert_eq!(task.status(), TaskStatus::Running);
        assert_eq!(task.progress_percent, Some(40));
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_unknown_status() {
        let task: Task = serde_json::from_str(r#"{"id":"t1","status":"paused"}"#).unwrap();
        assert_eq!(task.status(), TaskStatus::Unknown);
    }

    #[test]
    fn test_options_bind_path() {
        let params = GetTaskOptions::new("t-1").with_header("X-Trace", "1").params().unwrap();
        assert_eq!(params.path_value("id"), Some("t-1"));
        assert_eq!(params.caller_headers(), &[("X-Trace".to_string(), "1".to_string())]);
    }
}
