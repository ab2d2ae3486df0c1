//
//  cloud-databases
//  auth/iam.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # IAM Authentication Module
//!
//! Exchanges an IBM Cloud API key for a short-lived access token and sends it
//! as a bearer token.
//!
//! ## Flow
//!
//! 1. On the first request, POST the API key to `{url}/identity/token`
//! 2. Cache the returned access token
//! 3. Reuse it until 80% of its lifetime has passed, then fetch a new one
//!
//! If a refresh fails while the cached token is still valid, the cached token
//! is used and the failure is logged.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cloud_databases::auth::IamAuthenticator;
//!
//! let auth = IamAuthenticator::builder()
//!     .apikey("my-api-key")
//!     .client_credentials("bx", "bx")
//!     .scope("openid")
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Security Notes
//!
//! - The API key, client secret and cached token are redacted from `Debug`
//! - Disabling SSL verification for the token endpoint is meant for tests only

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::{check_credential, AuthType, Authenticator};
use crate::api::common::ApiError;

/// Default IAM endpoint.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

const TOKEN_PATH: &str = "/identity/token";
const GRANT_TYPE_APIKEY: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Fraction of the token lifetime after which a new token is fetched.
const REFRESH_FRACTION: f64 = 0.8;

/// Longest token lifetime trusted from the server's `expires_in`.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct IamTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Expiry as seconds since the epoch.
    #[serde(default)]
    pub expiration: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
    expires_at: Instant,
}

impl CachedToken {
    fn from_response(response: IamTokenResponse, fetched_at: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).min(MAX_TOKEN_LIFETIME);
        // An unrepresentable instant leaves the token due for refresh at once.
        let after = |elapsed: Duration| fetched_at.checked_add(elapsed).unwrap_or(fetched_at);
        Self {
            access_token: response.access_token,
            refresh_at: after(lifetime.mul_f64(REFRESH_FRACTION)),
            expires_at: after(lifetime),
        }
    }

    fn needs_refresh(&self, now: Instant) -> bool {
        now >= self.refresh_at
    }

    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Builder for [`IamAuthenticator`].
#[derive(Default)]
pub struct IamAuthenticatorBuilder {
    apikey: String,
    url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    disable_ssl_verification: bool,
}

impl IamAuthenticatorBuilder {
    pub fn apikey(mut self, apikey: impl Into<String>) -> Self {
        self.apikey = apikey.into();
        self
    }

    /// Overrides the IAM endpoint; [`DEFAULT_IAM_URL`] otherwise.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sends the token request with Basic authentication.
    pub fn client_credentials(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self.client_secret = Some(secret.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn disable_ssl_verification(mut self, disable: bool) -> Self {
        self.disable_ssl_verification = disable;
        self
    }

    /// Builds the authenticator.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the IAM URL is malformed and a
    /// `Configuration` error if the HTTP client cannot be created.
    pub fn build(self) -> Result<IamAuthenticator, ApiError> {
        let base = self.url.as_deref().unwrap_or(DEFAULT_IAM_URL);
        let base = base.trim().trim_end_matches('/');
        let token_url = if base.ends_with(TOKEN_PATH) {
            base.to_string()
        } else {
            format!("{base}{TOKEN_PATH}")
        };
        let token_url = Url::parse(&token_url)
            .map_err(|err| ApiError::validation(format!("the IAM URL '{base}' is invalid: {err}")))?;

        let http = Client::builder()
            .user_agent(crate::default_user_agent())
            .danger_accept_invalid_certs(self.disable_ssl_verification)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| {
                ApiError::configuration(format!("failed to create IAM HTTP client: {err}"))
            })?;

        Ok(IamAuthenticator {
            apikey: self.apikey,
            token_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            scope: self.scope,
            http,
            cache: Mutex::new(None),
        })
    }
}

/// Authenticator that exchanges an API key for IAM access tokens.
pub struct IamAuthenticator {
    apikey: String,
    token_url: Url,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    http: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl IamAuthenticator {
    pub fn builder() -> IamAuthenticatorBuilder {
        IamAuthenticatorBuilder::default()
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Fetches a new token from the IAM endpoint, bypassing the cache.
    pub async fn request_token(&self) -> Result<IamTokenResponse, ApiError> {
        let mut form = vec![
            ("grant_type", GRANT_TYPE_APIKEY),
            ("apikey", self.apikey.as_str()),
            ("response_type", "cloud_iam"),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }

        let mut request = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&form);
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            request = request.basic_auth(id, Some(secret));
        }

        tracing::debug!("Requesting IAM token from {}", self.token_url);

        let response = request.send().await.map_err(|err| {
            ApiError::authentication("failed to reach the IAM token endpoint", Some(Box::new(err)))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload = serde_json::from_str::<serde_json::Value>(&body).ok();
            let message = payload
                .as_ref()
                .and_then(crate::api::common::extract_error_message)
                .unwrap_or(body);
            return Err(ApiError::authentication(
                format!("IAM token request failed ({}): {}", status.as_u16(), message),
                None,
            ));
        }

        response.json::<IamTokenResponse>().await.map_err(|err| {
            ApiError::authentication("failed to parse IAM token response", Some(Box::new(err)))
        })
    }

    /// Returns a cached token, fetching a new one when it is due.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        let mut cache = self.cache.lock().await;
        let now = Instant::now();

        if let Some(token) = cache.as_ref().filter(|token| !token.needs_refresh(now)) {
            return Ok(token.access_token.clone());
        }

        match self.request_token().await {
            Ok(response) => {
                let token = CachedToken::from_response(response, now);
                let access_token = token.access_token.clone();
                *cache = Some(token);
                Ok(access_token)
            }
            Err(err) => match cache.as_ref().filter(|token| token.is_valid(now)) {
                Some(token) => {
                    tracing::warn!("IAM token refresh failed, using cached token: {}", err);
                    Ok(token.access_token.clone())
                }
                None => Err(err),
            },
        }
    }
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("apikey", &"[REDACTED]")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .finish()
    }
}

#[async_trait]
impl Authenticator for IamAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::Iam
    }

    fn validate(&self) -> Result<(), ApiError> {
        check_credential("apikey", &self.apikey)?;
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if id.is_empty() || secret.is_empty() => Err(
                ApiError::validation("client id and client secret must both be non-empty"),
            ),
            _ => Ok(()),
        }
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), ApiError> {
        let token = self.access_token().await?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
            ApiError::authentication("IAM returned an invalid token", Some(Box::new(err)))
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use mockito::Matcher;

    const TOKEN_BODY: &str = r#"{
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "token_type": "Bearer",
        "expires_in": 3600,
        "expiration": 1893456000
    }"#;

    #[test]
    fn test_builder_appends_token_path() {
        let auth = IamAuthenticator::builder()
            .apikey("key")
            .url("https://iam.example.com/")
            .build()
            .unwrap();
        assert_eq!(auth.token_url().as_str(), "https://iam.example.com/identity/token");
    }

    #[test]
    fn test_validate() {
        let auth = IamAuthenticator::builder().build().unwrap();
        assert_eq!(auth.validate().unwrap_err().kind(), ErrorKind::Validation);

        let auth = IamAuthenticator::builder()
            .apikey("key")
            .client_credentials("bx", "")
            .build()
            .unwrap();
        assert!(auth.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = IamAuthenticator::builder()
            .apikey("super-secret-key")
            .client_credentials("bx", "client-secret")
            .build()
            .unwrap();
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(!debug.contains("client-secret"));
    }

    #[tokio::test]
    async fn test_token_is_fetched_once_and_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/identity/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), GRANT_TYPE_APIKEY.into()),
                Matcher::UrlEncoded("apikey".into(), "my-key".into()),
                Matcher::UrlEncoded("response_type".into(), "cloud_iam".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOKEN_BODY)
            .expect(1)
            .create_async()
            .await;

        let auth = IamAuthenticator::builder()
            .apikey("my-key")
            .url(server.url())
            .build()
            .unwrap();

        for _ in 0..2 {
            let mut headers = HeaderMap::new();
            auth.authenticate(&mut headers).await.unwrap();
            assert_eq!(headers[AUTHORIZATION], "Bearer access-1");
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_failure_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/identity/token")
            .with_status(400)
            .with_body(r#"{"errorMessage":"Provided API key could not be found"}"#)
            .create_async()
            .await;

        let auth = IamAuthenticator::builder()
            .apikey("bad-key")
            .url(server.url())
            .build()
            .unwrap();

        let err = auth.access_token().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.message().contains("Provided API key could not be found"));
    }

    #[test]
    fn test_cached_token_refresh_window() {
        let now = Instant::now();
        let token = CachedToken::from_response(
            serde_json::from_str::<IamTokenResponse>(TOKEN_BODY).unwrap(),
            now,
        );
        assert!(!token.needs_refresh(now + Duration::from_secs(2879)));
        assert!(token.needs_refresh(now + Duration::from_secs(2880)));
        assert!(token.is_valid(now + Duration::from_secs(3599)));
    }

    #[test]
    fn test_cached_token_clamps_huge_lifetime() {
        let now = Instant::now();
        let mut response = serde_json::from_str::<IamTokenResponse>(TOKEN_BODY).unwrap();
        response.expires_in = u64::MAX;

        let token = CachedToken::from_response(response, now);
        assert_eq!(token.expires_at, now + MAX_TOKEN_LIFETIME);
        assert!(token.is_valid(now + MAX_TOKEN_LIFETIME - Duration::from_secs(1)));
        assert!(!token.is_valid(now + MAX_TOKEN_LIFETIME));
        assert!(!token.needs_refresh(now + Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn test_huge_expires_in_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/identity/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"access-1","expires_in":{}}}"#,
                u64::MAX
            ))
            .expect(1)
            .create_async()
            .await;

        let auth = IamAuthenticator::builder()
            .apikey("my-key")
            .url(server.url())
            .build()
            .unwrap();

        assert_eq!(auth.access_token().await.unwrap(), "access-1");
        assert_eq!(auth.access_token().await.unwrap(), "access-1");
        mock.assert_async().await;
    }
}
