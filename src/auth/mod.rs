//
//  cloud-databases
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Every request leaves the client with credentials stamped on it by an
//! [`Authenticator`]. The dispatcher calls [`Authenticator::authenticate`]
//! once per attempt, after building the request and before sending it.
//!
//! ## Supported Authentication Methods
//!
//! - **IAM**: API key exchanged for a short-lived bearer token at the IAM
//!   token endpoint. Tokens are cached and refreshed before they expire.
//!   Recommended for IBM Cloud.
//! - **Bearer Token**: A caller-managed access token sent as-is.
//! - **Basic**: Username and password.
//! - **No Auth**: Sends no credentials, for tests and proxies that add them.
//!
//! ## Module Structure
//!
//! - [`basic`]: Basic authentication
//! - [`token`]: Bearer token authentication
//! - [`iam`]: IAM API key authentication with token caching
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloud_databases::auth::{Authenticator, IamAuthenticator};
//! use cloud_databases::config::ServiceOptions;
//!
//! let authenticator = IamAuthenticator::builder()
//!     .apikey("my-api-key")
//!     .build()
//!     .unwrap();
//!
//! let options = ServiceOptions::new().with_authenticator(Arc::new(authenticator));
//! ```
//!
//! ## External Configuration
//!
//! [`authenticator_from_properties`] builds an authenticator from the
//! `<SERVICE>_AUTH_TYPE` family of properties. When `AUTH_TYPE` is absent it
//! defaults to `iam` if an `APIKEY` is present.

mod basic;
mod iam;
mod token;

pub use basic::*;
pub use iam::*;
pub use token::*;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::api::common::ApiError;
use crate::config::ServiceProperties;

pub const PROPNAME_AUTH_TYPE: &str = "AUTH_TYPE";
pub const PROPNAME_USERNAME: &str = "USERNAME";
pub const PROPNAME_PASSWORD: &str = "PASSWORD";
pub const PROPNAME_BEARER_TOKEN: &str = "BEARER_TOKEN";
pub const PROPNAME_APIKEY: &str = "APIKEY";
pub const PROPNAME_AUTH_URL: &str = "AUTH_URL";
pub const PROPNAME_CLIENT_ID: &str = "CLIENT_ID";
pub const PROPNAME_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const PROPNAME_SCOPE: &str = "SCOPE";
pub const PROPNAME_AUTH_DISABLE_SSL: &str = "AUTH_DISABLE_SSL";

/// Identifies an authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    NoAuth,
    Basic,
    BearerToken,
    Iam,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAuth => "noAuth",
            Self::Basic => "basic",
            Self::BearerToken => "bearerToken",
            Self::Iam => "iam",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = ApiError;

    /// Parses an auth type name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noauth" => Ok(Self::NoAuth),
            "basic" => Ok(Self::Basic),
            "bearertoken" => Ok(Self::BearerToken),
            "iam" => Ok(Self::Iam),
            other => Err(ApiError::configuration(format!(
                "unrecognized authentication type: '{other}'"
            ))),
        }
    }
}

/// Stamps credentials on outgoing requests.
///
/// Implementations must be shareable across clients and tasks; clones of a
/// client hold the same authenticator.
#[async_trait]
pub trait Authenticator: Send + Sync + fmt::Debug {
    fn auth_type(&self) -> AuthType;

    /// Checks the configuration. Called once when a client is constructed.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error describing the first invalid field.
    fn validate(&self) -> Result<(), ApiError>;

    /// Adds credentials to the request headers.
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error if credentials cannot be obtained.
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), ApiError>;
}

/// Authenticator that adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthAuthenticator;

#[async_trait]
impl Authenticator for NoAuthAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::NoAuth
    }

    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn authenticate(&self, _headers: &mut HeaderMap) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Builds an authenticator from service properties.
///
/// # Errors
///
/// Returns a `Configuration` error if no auth type can be determined or the
/// type is unknown, and a `Validation` error if the selected authenticator
/// is missing required properties.
pub fn authenticator_from_properties(
    props: &ServiceProperties,
) -> Result<Arc<dyn Authenticator>, ApiError> {
    let auth_type = match props.get(PROPNAME_AUTH_TYPE) {
        Some(value) => value.parse::<AuthType>()?,
        None if props.get(PROPNAME_APIKEY).is_some() => AuthType::Iam,
        None => {
            return Err(ApiError::configuration(
                "authentication type not specified; set AUTH_TYPE or APIKEY",
            ))
        }
    };

    tracing::debug!("Configuring {} authenticator from properties", auth_type);

    let authenticator: Arc<dyn Authenticator> = match auth_type {
        AuthType::NoAuth => Arc::new(NoAuthAuthenticator),
        AuthType::Basic => Arc::new(BasicAuthenticator::new(
            props.get(PROPNAME_USERNAME).unwrap_or_default(),
            props.get(PROPNAME_PASSWORD).unwrap_or_default(),
        )),
        AuthType::BearerToken => Arc::new(BearerTokenAuthenticator::new(
            props.get(PROPNAME_BEARER_TOKEN).unwrap_or_default(),
        )),
        AuthType::Iam => {
            let mut builder = IamAuthenticator::builder()
                .apikey(props.get(PROPNAME_APIKEY).unwrap_or_default())
                .disable_ssl_verification(props.get_bool(PROPNAME_AUTH_DISABLE_SSL)?.unwrap_or(false));
            if let Some(url) = props.get(PROPNAME_AUTH_URL) {
                builder = builder.url(url);
            }
            if let (Some(id), Some(secret)) =
                (props.get(PROPNAME_CLIENT_ID), props.get(PROPNAME_CLIENT_SECRET))
            {
                builder = builder.client_credentials(id, secret);
            }
            if let Some(scope) = props.get(PROPNAME_SCOPE) {
                builder = builder.scope(scope);
            }
            Arc::new(builder.build()?)
        }
    };

    authenticator.validate()?;
    Ok(authenticator)
}

/// Validates a credential value shared by several authenticators.
pub(crate) fn check_credential(name: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::validation(format!("the {name} must not be empty")));
    }
    if crate::config::has_bad_first_or_last_char(value) {
        return Err(ApiError::validation(format!(
            "the {name} must not be wrapped in {{, }} or \" characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use crate::config::EnvSnapshot;

    fn props(pairs: &[(&str, &str)]) -> ServiceProperties {
        let env: EnvSnapshot = pairs
            .iter()
            .map(|(name, value)| (format!("CLOUD_DATABASES_{name}"), value.to_string()))
            .collect();
        ServiceProperties::from_env("cloud_databases", &env)
    }

    #[test]
    fn test_auth_type_parse_ignores_case() {
        assert_eq!("IAM".parse::<AuthType>().unwrap(), AuthType::Iam);
        assert_eq!("bearerTOKEN".parse::<AuthType>().unwrap(), AuthType::BearerToken);
        assert_eq!("noauth".parse::<AuthType>().unwrap(), AuthType::NoAuth);
        assert_eq!(
            "kerberos".parse::<AuthType>().unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_from_properties_basic() {
        let auth =
            authenticator_from_properties(&props(&[("AUTH_TYPE", "Basic"), ("USERNAME", "admin"), ("PASSWORD", "pw")]))
                .unwrap();
        assert_eq!(auth.auth_type(), AuthType::Basic);
    }

    #[test]
    fn test_from_properties_defaults_to_iam_with_apikey() {
        let auth = authenticator_from_properties(&props(&[("APIKEY", "key")])).unwrap();
        assert_eq!(auth.auth_type(), AuthType::Iam);
    }

    #[test]
    fn test_from_properties_without_type_or_apikey() {
        let err = authenticator_from_properties(&props(&[("USERNAME", "admin")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_properties_missing_field_is_validation_error() {
        let err = authenticator_from_properties(&props(&[("AUTH_TYPE", "bearerToken")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_no_auth_adds_nothing() {
        let mut headers = HeaderMap::new();
        NoAuthAuthenticator.authenticate(&mut headers).await.unwrap();
        assert!(headers.is_empty());
    }
}
