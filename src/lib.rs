//
//  cloud-databases
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Cloud Databases SDK
//!
//! A client library for the IBM Cloud Databases v5 REST API.
//!
//! ## Overview
//!
//! The library manages hosted database deployments: users, configuration,
//! scaling and autoscaling, backups, allowlists, logical replication slots,
//! in-place version upgrades and connection strings.
//!
//! ## Features
//!
//! - **Typed Operations**: One options struct and one method per API operation
//! - **Pluggable Authentication**: No auth, Basic, bearer token and IAM API key
//! - **Retries**: Exponential backoff with jitter, honoring `Retry-After`
//! - **Cancellation**: Every operation has a `_with_context` variant taking a
//!   [`RequestContext`]
//! - **External Configuration**: Credentials file and environment variables
//!
//! ## Module Structure
//!
//! - [`api`]: Operation dispatch, the client and the v5 operations
//! - [`auth`]: Authenticators
//! - [`config`]: Service options, regions and external configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cloud_databases::api::v5::GetDeploymentInfoOptions;
//! use cloud_databases::{CloudDatabasesClient, ServiceOptions};
//!
//! # async fn run() -> Result<(), cloud_databases::ApiError> {
//! // Reads CLOUD_DATABASES_URL, CLOUD_DATABASES_AUTH_TYPE, CLOUD_DATABASES_APIKEY, ...
//! let client = CloudDatabasesClient::new_from_external_config(ServiceOptions::default())?;
//!
//! let info = client
//!     .get_deployment_info(&GetDeploymentInfoOptions::new("crn:v1:..."))
//!     .await?;
//! println!("{:?}", info.result());
//! # Ok(())
//! # }
//! ```

/// Operation dispatch and the Cloud Databases v5 operations.
///
/// Holds the client, the request pipeline (validation, URL expansion,
/// authentication, retries, decoding) and the per-operation wrappers.
pub mod api;

/// Authenticators.
///
/// Each authenticator stamps credentials onto outgoing request headers:
/// - No authentication
/// - HTTP Basic
/// - Static bearer token
/// - IAM API key exchange with token caching
pub mod auth;

/// Service configuration.
///
/// Builder-style [`ServiceOptions`], region URLs, and the loader for the
/// credentials file and environment variables.
pub mod config;

pub use api::{ApiError, CloudDatabasesClient, DetailedResponse, ErrorKind, RequestContext};
pub use config::ServiceOptions;

/// Library version, from Cargo.toml.
///
/// # Example
///
/// ```rust
/// use cloud_databases::VERSION;
///
/// println!("cloud-databases {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `User-Agent` sent with every request.
pub fn default_user_agent() -> String {
    format!("cloud-databases-rust-sdk/{}", VERSION)
}
