//
//  cloud-databases
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module provides everything needed to configure a
//! [`CloudDatabasesClient`](crate::api::CloudDatabasesClient): explicit
//! construction options, property loading from the environment or a
//! credentials file, and service URL resolution.
//!
//! ## Overview
//!
//! - **[`ServiceOptions`]**: URL, authenticator, timeout, retry policy,
//!   default headers and transport settings passed to the client
//! - **[`ServiceProperties`]**: `<SERVICE>_*` values read from an
//!   [`EnvSnapshot`] or a credentials file
//! - **Regions**: per-region URLs and URL template substitution
//!
//! ## External Configuration
//!
//! Properties are prefixed with the service name upper-cased, `-` mapped to
//! `_`. For the default service name `cloud_databases`:
//!
//! ```text
//! CLOUD_DATABASES_URL=https://api.eu-de.databases.cloud.ibm.com/v5/ibm
//! CLOUD_DATABASES_AUTH_TYPE=iam
//! CLOUD_DATABASES_APIKEY=my-api-key
//! CLOUD_DATABASES_ENABLE_RETRIES=true
//! CLOUD_DATABASES_MAX_RETRIES=3
//! ```
//!
//! Explicit [`ServiceOptions`] always win over loaded properties.
//!
//! ## Usage
//!
//! ```rust
//! use cloud_databases::config::{EnvSnapshot, ServiceProperties};
//!
//! let env = EnvSnapshot::from_iter([
//!     ("CLOUD_DATABASES_AUTH_TYPE".to_string(), "noauth".to_string()),
//!     ("CLOUD_DATABASES_URL".to_string(), "https://example.com/v5/ibm".to_string()),
//! ]);
//! let props = ServiceProperties::from_env("cloud_databases", &env);
//! assert_eq!(props.get("URL"), Some("https://example.com/v5/ibm"));
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: credentials file lookup and parsing
//! - [`regions`]: service URL resolution and validation

mod file;
mod regions;

pub use file::*;
pub use regions::*;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::common::ApiError;
use crate::api::retry::RetryPolicy;
use crate::api::transport::HttpTransport;
use crate::auth::{authenticator_from_properties, Authenticator};

/// Service name used for the property prefix and analytics header.
pub const DEFAULT_SERVICE_NAME: &str = "cloud_databases";

/// Timeout applied to calls made without an explicit context.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries scheduled when external config enables them without a count.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Backoff cap in seconds when external config enables retries.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 30;

pub const PROPNAME_SVC_URL: &str = "URL";
pub const PROPNAME_SVC_DISABLE_SSL: &str = "DISABLE_SSL";
pub const PROPNAME_SVC_ENABLE_GZIP: &str = "ENABLE_GZIP";
pub const PROPNAME_SVC_ENABLE_RETRIES: &str = "ENABLE_RETRIES";
pub const PROPNAME_SVC_MAX_RETRIES: &str = "MAX_RETRIES";
pub const PROPNAME_SVC_RETRY_INTERVAL: &str = "RETRY_INTERVAL";

/// Snapshot of environment variables.
///
/// Loading is a pure function of a snapshot, so tests inject one instead of
/// mutating the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl FromIterator<(String, String)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Returns the property prefix for a service name, e.g. `CLOUD_DATABASES_`.
pub fn property_prefix(service_name: &str) -> String {
    format!("{}_", service_name.to_uppercase().replace('-', "_"))
}

/// Service properties with the prefix stripped, keyed upper-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceProperties {
    values: HashMap<String, String>,
}

impl ServiceProperties {
    /// Loads properties from the first source that has any.
    ///
    /// The credentials file is consulted first, then the environment.
    pub fn load(service_name: &str, env: &EnvSnapshot) -> Result<Self, ApiError> {
        if let Some(path) = credentials_file_path(env) {
            let pairs = read_credentials_file(&path)?;
            let props = Self::from_pairs(service_name, pairs);
            if !props.is_empty() {
                tracing::debug!("Loaded {} properties from {}", props.values.len(), path.display());
                return Ok(props);
            }
        }

        Ok(Self::from_env(service_name, env))
    }

    pub fn from_env(service_name: &str, env: &EnvSnapshot) -> Self {
        Self::from_pairs(
            service_name,
            env.vars
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        )
    }

    /// Keeps the pairs whose key carries the service prefix.
    pub fn from_pairs<I>(service_name: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = property_prefix(service_name);
        let values = pairs
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(&prefix)
                    .map(|key| (key.to_uppercase(), value))
            })
            .collect();
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a non-empty property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_uppercase())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parses a boolean property (`true`/`false`, any case).
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(value) => Err(ApiError::configuration(format!(
                "property {key} must be true or false, got '{value}'"
            ))),
        }
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, ApiError> {
        self.get(key)
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| {
                    ApiError::configuration(format!(
                        "property {key} must be a non-negative integer, got '{value}'"
                    ))
                })
            })
            .transpose()
    }
}

/// Options for constructing a client.
///
/// Every field is optional; unset fields take the documented defaults or,
/// with external configuration, the loaded property values.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cloud_databases::auth::BasicAuthenticator;
/// use cloud_databases::config::ServiceOptions;
///
/// let options = ServiceOptions::new()
///     .with_url("https://api.eu-de.databases.cloud.ibm.com/v5/ibm")
///     .with_authenticator(Arc::new(BasicAuthenticator::new("admin", "secret")))
///     .with_timeout(Duration::from_secs(10))
///     .with_header("X-Correlation-Id", "abc123");
/// assert_eq!(options.default_headers.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub service_name: Option<String>,
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub timeout: Option<Duration>,
    pub retry: Option<RetryPolicy>,
    pub default_headers: HashMap<String, String>,
    pub user_agent: Option<String>,
    pub enable_gzip: bool,
    pub gzip_threshold: Option<usize>,
    pub disable_ssl_verification: bool,
    /// Replaces the default `reqwest` transport.
    pub transport: Option<Arc<dyn HttpTransport>>,
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_gzip(mut self, enabled: bool) -> Self {
        self.enable_gzip = enabled;
        self
    }

    /// Smallest request body, in bytes, that is compressed when gzip is on.
    pub fn with_gzip_threshold(mut self, threshold: usize) -> Self {
        self.gzip_threshold = Some(threshold);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }

    /// Fills unset options from loaded properties.
    ///
    /// Options already set are left alone. An authenticator is built from
    /// the properties only if none was given.
    pub fn merge_properties(mut self, props: &ServiceProperties) -> Result<Self, ApiError> {
        if self.url.as_deref().map_or(true, str::is_empty) {
            if let Some(url) = props.get(PROPNAME_SVC_URL) {
                self.url = Some(url.to_string());
            }
        }

        if self.authenticator.is_none() {
            self.authenticator = Some(authenticator_from_properties(props)?);
        }

        if !self.disable_ssl_verification {
            self.disable_ssl_verification =
                props.get_bool(PROPNAME_SVC_DISABLE_SSL)?.unwrap_or(false);
        }

        if !self.enable_gzip {
            self.enable_gzip = props.get_bool(PROPNAME_SVC_ENABLE_GZIP)?.unwrap_or(false);
        }

        if self.retry.is_none() && props.get_bool(PROPNAME_SVC_ENABLE_RETRIES)?.unwrap_or(false) {
            let max_retries = match props.get_u64(PROPNAME_SVC_MAX_RETRIES)? {
                Some(value) => u32::try_from(value).map_err(|_| {
                    ApiError::configuration(format!("{PROPNAME_SVC_MAX_RETRIES} is too large"))
                })?,
                None => DEFAULT_MAX_RETRIES,
            };
            let interval = props
                .get_u64(PROPNAME_SVC_RETRY_INTERVAL)?
                .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

            let mut policy = RetryPolicy::new(max_retries.saturating_add(1), Duration::ZERO);
            policy.backoff.max = Duration::from_secs(interval);
            self.retry = Some(policy);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use crate::auth::{AuthType, NoAuthAuthenticator};

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_property_prefix() {
        assert_eq!(property_prefix("cloud_databases"), "CLOUD_DATABASES_");
        assert_eq!(property_prefix("my-service"), "MY_SERVICE_");
    }

    #[test]
    fn test_from_env_filters_prefix() {
        let env = env(&[
            ("CLOUD_DATABASES_URL", "https://example.com"),
            ("CLOUD_DATABASES_AUTH_TYPE", "basic"),
            ("OTHER_URL", "https://other.example.com"),
            ("CLOUD_DATABASES_SCOPE", ""),
        ]);
        let props = ServiceProperties::from_env("cloud_databases", &env);
        assert_eq!(props.get("URL"), Some("https://example.com"));
        assert_eq!(props.get("auth_type"), Some("basic"));
        assert_eq!(props.get("SCOPE"), None);
    }

    #[test]
    fn test_typed_getters() {
        let props = ServiceProperties::from_pairs(
            "cloud_databases",
            env(&[
                ("CLOUD_DATABASES_ENABLE_RETRIES", "TRUE"),
                ("CLOUD_DATABASES_MAX_RETRIES", "2"),
                ("CLOUD_DATABASES_DISABLE_SSL", "maybe"),
            ])
            .vars,
        );
        assert_eq!(props.get_bool("ENABLE_RETRIES").unwrap(), Some(true));
        assert_eq!(props.get_u64("MAX_RETRIES").unwrap(), Some(2));
        assert_eq!(
            props.get_bool("DISABLE_SSL").unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_merge_keeps_explicit_options() {
        let props = ServiceProperties::from_env(
            "cloud_databases",
            &env(&[
                ("CLOUD_DATABASES_URL", "https://from-env.example.com"),
                ("CLOUD_DATABASES_AUTH_TYPE", "noauth"),
                ("CLOUD_DATABASES_ENABLE_RETRIES", "true"),
                ("CLOUD_DATABASES_MAX_RETRIES", "2"),
                ("CLOUD_DATABASES_RETRY_INTERVAL", "5"),
            ]),
        );

        let merged = ServiceOptions::new()
            .with_url("https://explicit.example.com")
            .merge_properties(&props)
            .unwrap();
        assert_eq!(merged.url.as_deref(), Some("https://explicit.example.com"));
        assert_eq!(merged.authenticator.unwrap().auth_type(), AuthType::NoAuth);

        let retry = merged.retry.unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.backoff.max, Duration::from_secs(5));
    }

    #[test]
    fn test_merge_fills_url_and_keeps_authenticator() {
        let props = ServiceProperties::from_env(
            "cloud_databases",
            &env(&[
                ("CLOUD_DATABASES_URL", "https://from-env.example.com"),
                ("CLOUD_DATABASES_AUTH_TYPE", "nonsense"),
            ]),
        );

        let merged = ServiceOptions::new()
            .with_authenticator(Arc::new(NoAuthAuthenticator))
            .merge_properties(&props)
            .unwrap();
        assert_eq!(merged.url.as_deref(), Some("https://from-env.example.com"));
        assert!(merged.retry.is_none());
    }
}
