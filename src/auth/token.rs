//
//  cloud-databases
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bearer Token Authentication
//!
//! Sends a caller-managed access token as `Authorization: Bearer <token>`.
//! The SDK never refreshes the token; callers replace it with
//! [`BearerTokenAuthenticator::set_bearer_token`] before it expires.
//!
//! ## Example
//!
//! ```rust
//! use cloud_databases::auth::BearerTokenAuthenticator;
//!
//! let auth = BearerTokenAuthenticator::new("eyJhbGciOi...");
//! auth.set_bearer_token("eyJhbGciOi...refreshed");
//! ```

use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use super::{AuthType, Authenticator};
use crate::api::common::ApiError;

pub struct BearerTokenAuthenticator {
    token: RwLock<String>,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(token.into()),
        }
    }

    /// Replaces the token used by subsequent requests, including requests
    /// made by clones of clients that share this authenticator.
    pub fn set_bearer_token(&self, token: impl Into<String>) {
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = token.into();
    }

    fn current(&self) -> String {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::BearerToken
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.current().trim().is_empty() {
            return Err(ApiError::validation("the bearer token must not be empty"));
        }
        Ok(())
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.current()))
            .map_err(|err| ApiError::authentication("invalid bearer token", Some(Box::new(err))))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}
