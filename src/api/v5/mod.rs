//
//  cloud-databases
//  api/v5/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Cloud Databases API v5 operations.
//!
//! Every operation is a descriptor constant, an options struct and a pair of
//! client methods. The methods are thin wrappers over
//! [`CloudDatabasesClient::execute`](super::CloudDatabasesClient::execute).
//!
//! # Module Organization
//!
//! - [`catalog`] - Deployables, regions, deployment info, default groups
//! - [`users`] - Database users
//! - [`configuration`] - Database configuration
//! - [`replication`] - Read replicas and logical replication slots
//! - [`tasks`] - Long-running tasks
//! - [`backups`] - Backups and point-in-time recovery
//! - [`connections`] - Connection strings
//! - [`scaling`] - Scaling groups and autoscaling
//! - [`management`] - Connection termination and version upgrades
//! - [`allowlist`] - IP allowlists
//! - [`capability`] - Capability queries
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::{GetDeploymentInfoOptions, ListDeploymentTasksOptions};
//! use cloud_databases::api::CloudDatabasesClient;
//!
//! async fn show(client: &CloudDatabasesClient, id: &str) -> Result<(), cloud_databases::ApiError> {
//!     let info = client.get_deployment_info(&GetDeploymentInfoOptions::new(id)).await?;
//!     println!("{:?}", info.result());
//!
//!     let tasks = client.list_deployment_tasks(&ListDeploymentTasksOptions::new(id)).await?;
//!     println!("{} task(s)", tasks.result().map(|t| t.tasks.len()).unwrap_or(0));
//!     Ok(())
//! }
//! ```
//!
//! # Notes
//!
//! - Writes that start work on the service answer `202` with a task; poll it
//!   with `get_task`
//! - Path parameters are percent-encoded; IDs that are CRNs can be passed
//!   as-is

pub mod allowlist;
pub mod backups;
pub mod capability;
pub mod catalog;
pub mod configuration;
pub mod connections;
pub mod management;
pub mod replication;
pub mod scaling;
pub mod tasks;
pub mod users;

pub use allowlist::*;
pub use backups::*;
pub use capability::*;
pub use catalog::*;
pub use configuration::*;
pub use connections::*;
pub use management::*;
pub use replication::*;
pub use scaling::*;
pub use tasks::*;
pub use users::*;
