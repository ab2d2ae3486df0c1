//
//  cloud-databases
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Cloud Databases Service Client
//!
//! This module provides [`CloudDatabasesClient`], which runs every operation
//! through one pipeline:
//!
//! ```text
//! options -> validate -> build -> (authenticate -> send)+ -> decode
//! ```
//!
//! ## Features
//!
//! - Construction from explicit options or from external configuration
//! - Service URL validation and per-region resolution
//! - Per-attempt authentication
//! - Retry with exponential backoff for transport failures and retriable
//!   statuses
//! - Cancellation and deadlines through [`RequestContext`]
//! - Independent clones that share the authenticator
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloud_databases::api::v5::ListDeployablesOptions;
//! use cloud_databases::api::CloudDatabasesClient;
//! use cloud_databases::auth::IamAuthenticator;
//! use cloud_databases::config::ServiceOptions;
//!
//! # async fn example() -> Result<(), cloud_databases::ApiError> {
//! let authenticator = IamAuthenticator::builder().apikey("my-api-key").build()?;
//! let client = CloudDatabasesClient::new(
//!     ServiceOptions::new().with_authenticator(Arc::new(authenticator)),
//! )?;
//!
//! let response = client.list_deployables(&ListDeployablesOptions::new()).await?;
//! for deployable in response.result().map(|r| r.deployables.as_slice()).unwrap_or_default() {
//!     println!("{}", deployable.kind);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::common::{ApiError, DetailedResponse, ERRORMSG_SERVICE_URL_MISSING};
use crate::api::context::RequestContext;
use crate::api::operation::{validate_request, Operation, OperationOptions};
use crate::api::request::{build_request, BuildSettings, DEFAULT_GZIP_THRESHOLD};
use crate::api::response::decode_response;
use crate::api::retry::{retry_after, RetryPolicy};
use crate::api::transport::{
    send_with_context, HttpRequest, HttpTransport, ReqwestTransport, TransportSettings,
};
use crate::auth::Authenticator;
use crate::config::{
    service_url_for_region, validate_service_url, EnvSnapshot, ServiceOptions, ServiceProperties,
    DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT,
};

/// Configuration shared by a client and its clones.
#[derive(Debug)]
struct ServiceConfig {
    service_name: String,
    authenticator: Arc<dyn Authenticator>,
    default_headers: HeaderMap,
    user_agent: String,
    timeout: Duration,
}

/// Client for the Cloud Databases v5 API.
///
/// The authenticator and default headers are shared with clones. The
/// service URL, retry policy, compression setting and HTTP connection pool
/// belong to each client: changing them on a clone never affects the
/// original.
///
/// Concurrent calls on one client are safe.
pub struct CloudDatabasesClient {
    config: Arc<ServiceConfig>,
    service_url: String,
    retry: RetryPolicy,
    gzip_enabled: bool,
    gzip_threshold: usize,
    transport: Arc<dyn HttpTransport>,
}

impl CloudDatabasesClient {
    /// Creates a client from explicit options.
    ///
    /// An unset or empty URL selects [`DEFAULT_SERVICE_URL`].
    ///
    /// # Errors
    ///
    /// - `Configuration` if no authenticator was given or the transport
    ///   cannot be created
    /// - `Validation` if the authenticator, URL or a default header is
    ///   invalid
    pub fn new(options: ServiceOptions) -> Result<Self, ApiError> {
        let authenticator = options
            .authenticator
            .clone()
            .ok_or_else(|| ApiError::configuration("an authenticator must be provided"))?;
        authenticator.validate()?;

        let service_url = match options.url.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SERVICE_URL.to_string(),
            Some(url) => validate_service_url(url)?,
        };

        let mut default_headers = HeaderMap::new();
        for (name, value) in &options.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                ApiError::validation(format!("invalid default header name '{name}': {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                ApiError::validation(format!("invalid value for default header '{name}': {err}"))
            })?;
            default_headers.insert(name, value);
        }

        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(crate::default_user_agent);

        let transport = match options.transport.clone() {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(TransportSettings {
                user_agent: user_agent.clone(),
                disable_ssl_verification: options.disable_ssl_verification,
                ..TransportSettings::default()
            })?),
        };

        tracing::debug!(
            "Created {} client for {} ({} auth)",
            options.service_name(),
            service_url,
            authenticator.auth_type()
        );

        Ok(Self {
            config: Arc::new(ServiceConfig {
                service_name: options.service_name().to_string(),
                authenticator,
                default_headers,
                user_agent,
                timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT),
            }),
            service_url,
            retry: options.retry.unwrap_or_default(),
            gzip_enabled: options.enable_gzip,
            gzip_threshold: options.gzip_threshold.unwrap_or(DEFAULT_GZIP_THRESHOLD),
            transport,
        })
    }

    /// Creates a client from the process environment and credentials file.
    ///
    /// Values already set in `options` take precedence.
    pub fn new_from_external_config(options: ServiceOptions) -> Result<Self, ApiError> {
        Self::new_from_external_config_with_env(options, &EnvSnapshot::capture())
    }

    /// Same as [`new_from_external_config`](Self::new_from_external_config)
    /// with an explicit environment snapshot.
    pub fn new_from_external_config_with_env(
        options: ServiceOptions,
        env: &EnvSnapshot,
    ) -> Result<Self, ApiError> {
        let props = ServiceProperties::load(options.service_name(), env)?;
        Self::new(options.merge_properties(&props)?)
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Replaces the service URL.
    ///
    /// An empty URL is accepted; calls then fail with a `Configuration`
    /// error until a URL is set again.
    pub fn set_service_url(&mut self, url: &str) -> Result<(), ApiError> {
        self.service_url = if url.trim().is_empty() {
            String::new()
        } else {
            validate_service_url(url)?
        };
        Ok(())
    }

    /// Points the client at the canonical URL of a region.
    pub fn set_service_url_for_region(&mut self, region: &str) -> Result<(), ApiError> {
        self.service_url = service_url_for_region(region)?;
        Ok(())
    }

    /// Enables retries with `max_attempts` total attempts.
    ///
    /// A zero `max_elapsed` leaves the total time unbounded.
    pub fn enable_retries(&mut self, max_attempts: u32, max_elapsed: Duration) {
        self.retry.max_attempts = max_attempts;
        self.retry.max_elapsed = max_elapsed;
    }

    pub fn disable_retries(&mut self) {
        self.retry.max_attempts = 0;
        self.retry.max_elapsed = Duration::ZERO;
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry = policy;
    }

    /// Turns request body compression on or off. The configured size
    /// threshold is kept across toggles.
    pub fn enable_gzip_compression(&mut self, enabled: bool) {
        self.gzip_enabled = enabled;
    }

    pub fn is_gzip_enabled(&self) -> bool {
        self.gzip_enabled
    }

    /// Smallest body compressed when compression is on, `None` when it is
    /// off.
    pub fn gzip_threshold(&self) -> Option<usize> {
        self.gzip_enabled.then_some(self.gzip_threshold)
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.config.authenticator
    }

    /// Scope used by operation methods without an explicit context.
    pub fn default_context(&self) -> RequestContext {
        if self.config.timeout.is_zero() {
            RequestContext::background()
        } else {
            RequestContext::with_timeout(self.config.timeout)
        }
    }

    /// Runs one operation.
    ///
    /// Every typed operation method delegates here. It is public so callers
    /// can reach endpoints by descriptor.
    ///
    /// # Errors
    ///
    /// See [`ErrorKind`](crate::api::common::ErrorKind) for the possible
    /// kinds. Validation failures never touch the network.
    pub async fn execute<T, O>(
        &self,
        ctx: &RequestContext,
        operation: &Operation,
        options: Option<&O>,
    ) -> Result<DetailedResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        O: OperationOptions + ?Sized,
    {
        let params = options.map(|options| options.params()).transpose()?;
        let params = validate_request(operation, params.as_ref())?;

        if self.service_url.is_empty() {
            return Err(ApiError::configuration(format!(
                "{ERRORMSG_SERVICE_URL_MISSING}; set a URL before calling {}",
                operation.id
            )));
        }
        let service_url = Url::parse(&self.service_url).map_err(|err| {
            ApiError::configuration(format!("service URL '{}' is invalid: {err}", self.service_url))
        })?;

        let request = build_request(
            operation,
            params,
            &service_url,
            &BuildSettings {
                service_name: &self.config.service_name,
                default_headers: &self.config.default_headers,
                user_agent: &self.config.user_agent,
                gzip_threshold: self.gzip_threshold(),
            },
        )?;

        self.dispatch(ctx, operation, request).await
    }

    /// Authenticates, sends and decodes the request, retrying per the
    /// policy.
    ///
    /// Each attempt is decoded before the retry decision, so a 2xx response
    /// never consults `retry_statuses` and an undecodable body is retried
    /// only when the policy allows it.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        operation: &Operation,
        request: HttpRequest,
    ) -> Result<DetailedResponse<T>, ApiError> {
        let policy = &self.retry;
        let total_attempts = policy.total_attempts();
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let mut request = request.clone();

            tokio::select! {
                biased;
                reason = ctx.done() => return Err(ApiError::cancelled(reason, None)),
                result = self.config.authenticator.authenticate(&mut request.headers) => result?,
            }

            tracing::debug!(
                "{} {} {} (attempt {}/{})",
                operation.id,
                request.method,
                request.url,
                attempt,
                total_attempts
            );

            let err = match send_with_context(self.transport.as_ref(), ctx, request, policy.attempt_timeout)
                .await
                .and_then(|response| decode_response::<T>(operation, response))
            {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };
            if !policy.is_retriable(&err) || attempt >= total_attempts {
                return Err(err);
            }

            let wait = policy.next_delay(attempt - 1, err.response().and_then(retry_after));
            if !policy.within_budget(started.elapsed() + wait) {
                tracing::debug!("{}: retry budget exhausted after {} attempts", operation.id, attempt);
                return Err(err);
            }

            tracing::warn!("{} failed: {}, retrying in {:?}", operation.id, err, wait);

            tokio::select! {
                biased;
                reason = ctx.done() => return Err(ApiError::cancelled(reason, Some(err))),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

impl Clone for CloudDatabasesClient {
    /// Shares the authenticator and default headers; copies the URL, retry
    /// policy and compression setting; opens a separate connection pool.
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            service_url: self.service_url.clone(),
            retry: self.retry.clone(),
            gzip_enabled: self.gzip_enabled,
            gzip_threshold: self.gzip_threshold,
            transport: self.transport.fork(),
        }
    }
}

impl fmt::Debug for CloudDatabasesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudDatabasesClient")
            .field("service_name", &self.config.service_name)
            .field("service_url", &self.service_url)
            .field("authenticator", &self.config.authenticator)
            .field("retry", &self.retry)
            .field("gzip_threshold", &self.gzip_threshold())
            .finish()
    }
}
