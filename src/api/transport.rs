//
//  cloud-databases
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport
//!
//! The transport performs exactly one HTTP exchange and returns the
//! [`Envelope`] whatever the status code. It knows nothing about retries,
//! authentication or decoding.
//!
//! ## Architecture
//!
//! - [`HttpTransport`]: the seam the client sends through; swap it to test
//!   or to route requests through a custom stack
//! - [`ReqwestTransport`]: the default implementation on top of `reqwest`
//! - [`send_with_context`]: runs one exchange inside a [`RequestContext`],
//!   aborting it when the scope fires
//!
//! ## Cloning
//!
//! [`HttpTransport::fork`] returns an independent handle. For
//! [`ReqwestTransport`] this means a fresh connection pool built from the
//! same [`TransportSettings`], so a cloned client never contends with its
//! source.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Client;
use url::Url;

use crate::api::common::{ApiError, Envelope};
use crate::api::context::RequestContext;

/// HTTP methods used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully built request, ready to be authenticated and sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Transport abstraction for one HTTP exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Send a request and read the whole response body.
    async fn send(&self, request: HttpRequest) -> Result<Envelope, ApiError>;

    /// Returns an independent handle with the same settings.
    fn fork(&self) -> Arc<dyn HttpTransport>;
}

/// Settings used to build the default transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    pub user_agent: String,
    pub disable_ssl_verification: bool,
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            user_agent: crate::default_user_agent(),
            disable_ssl_verification: false,
            connect_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Production transport using `reqwest`.
#[derive(Debug)]
pub struct ReqwestTransport {
    http: Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(settings.disable_ssl_verification);
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let http = builder.build().map_err(|err| {
            ApiError::configuration(format!("failed to create HTTP client: {err}"))
        })?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Envelope, ApiError> {
        let mut builder = self
            .http
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Envelope::new(status, headers, body))
    }

    fn fork(&self) -> Arc<dyn HttpTransport> {
        match Self::new(self.settings.clone()) {
            Ok(transport) => Arc::new(transport),
            Err(err) => {
                tracing::warn!("Could not build a separate HTTP client, sharing the pool: {}", err);
                Arc::new(Self {
                    http: self.http.clone(),
                    settings: self.settings.clone(),
                })
            }
        }
    }
}

/// Runs a single exchange inside the caller's scope.
///
/// An already expired scope returns `Cancelled` without touching the network.
/// If the scope fires mid-flight the exchange future is dropped, which aborts
/// the request. A per-attempt timeout surfaces as a `Transport` error so the
/// retry policy can schedule another attempt.
pub async fn send_with_context(
    transport: &dyn HttpTransport,
    ctx: &RequestContext,
    request: HttpRequest,
    attempt_timeout: Option<Duration>,
) -> Result<Envelope, ApiError> {
    if let Some(reason) = ctx.err() {
        return Err(ApiError::cancelled(reason, None));
    }

    tokio::select! {
        biased;
        reason = ctx.done() => Err(ApiError::cancelled(reason, None)),
        result = exchange(transport, request, attempt_timeout) => result,
    }
}

async fn exchange(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    attempt_timeout: Option<Duration>,
) -> Result<Envelope, ApiError> {
    match attempt_timeout {
        Some(timeout) => tokio::time::timeout(timeout, transport.send(request))
            .await
            .map_err(|_| ApiError::transport(format!("attempt timed out after {timeout:?}"), None))?,
        None => transport.send(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct SlowTransport {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl HttpTransport for SlowTransport {
        async fn send(&self, _request: HttpRequest) -> Result<Envelope, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Envelope::new(200, HeaderMap::new(), Bytes::new()))
        }

        fn fork(&self) -> Arc<dyn HttpTransport> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: self.delay,
            })
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse("http://localhost/v5/ibm/regions").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_expired_scope_skips_network() {
        let transport = SlowTransport::default();
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = send_with_context(&transport, &ctx, request(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deadline_aborts_exchange() {
        let transport = SlowTransport {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(200),
        };
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));

        let err = send_with_context(&transport, &ctx, request(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.message().contains("deadline exceeded"));
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_transport_error() {
        let transport = SlowTransport {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(200),
        };
        let ctx = RequestContext::background();

        let err = send_with_context(&transport, &ctx, request(), Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
    }
}
