//
//  cloud-databases
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! Turns a typed operation request into an authenticated, retryable,
//! cancellable HTTP exchange and the response into a typed result.
//!
//! ## Architecture
//!
//! - [`operation`]: Operation descriptors, request parameters and validation
//! - [`request`]: URL expansion, headers, body encoding
//! - [`transport`]: The [`HttpTransport`] seam and its `reqwest` implementation
//! - [`retry`]: Retry policy and backoff
//! - [`response`]: Status classification and body decoding
//! - [`context`]: Caller-supplied cancellation and deadlines
//! - [`client`]: [`CloudDatabasesClient`], which ties the pieces together
//! - [`v5`]: The Cloud Databases v5 operations
//! - [`common`]: Errors and response envelopes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloud_databases::api::v5::ListDeployablesOptions;
//! use cloud_databases::api::CloudDatabasesClient;
//! use cloud_databases::auth::IamAuthenticator;
//! use cloud_databases::ServiceOptions;
//!
//! # async fn run() -> Result<(), cloud_databases::ApiError> {
//! let authenticator = IamAuthenticator::builder().apikey("my-api-key").build()?;
//! let client = CloudDatabasesClient::new(
//!     ServiceOptions::default().with_authenticator(Arc::new(authenticator)),
//! )?;
//!
//! let response = client.list_deployables(&ListDeployablesOptions::new()).await?;
//! println!("status {}", response.status_code());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ApiError`] tagged with an [`ErrorKind`]:
//!
//! - `Validation`: a required field or URL was missing or malformed
//! - `Configuration`: the client cannot send at all (no URL, bad region)
//! - `Authentication`: credentials could not be attached
//! - `Cancelled`: the caller's context was cancelled or its deadline passed
//! - `Transport`: network or TLS failure
//! - `ServerError`: non-2xx status, with the response attached
//! - `ResponseProcessing`: 2xx status whose body did not decode

pub mod client;
pub mod common;
pub mod context;
pub mod operation;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;
pub mod v5;

pub use client::CloudDatabasesClient;
pub use common::{ApiError, DetailedResponse, Envelope, ErrorKind};
pub use context::{CancelReason, RequestContext};
pub use operation::{Operation, OperationOptions, RequestParams};
pub use retry::{Backoff, RetryPolicy};
pub use transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
