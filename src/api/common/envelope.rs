//
//  cloud-databases
//  api/common/envelope.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Response envelopes.
//!
//! An [`Envelope`] is what the transport hands back after one exchange: the
//! status code, the response headers and the whole body read into memory.
//! [`DetailedResponse`] pairs an envelope with the typed result decoded from
//! it.

use std::borrow::Cow;

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};

/// Raw response of a single HTTP exchange.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Complete response body.
    pub body: Bytes,
}

impl Envelope {
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Value of the `Content-Length` header, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }

    /// Returns `true` if there is nothing to decode.
    ///
    /// A body made only of whitespace counts as empty.
    pub fn is_empty_body(&self) -> bool {
        self.content_length() == Some(0) || self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Looks up a header by name and returns it as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Body as UTF-8 text, lossily converted.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A typed result together with the envelope it was decoded from.
///
/// `result` is `None` when the server answered with a success status and an
/// empty body.
///
/// # Example
///
/// ```rust,no_run
/// use cloud_databases::api::CloudDatabasesClient;
/// use cloud_databases::api::v5::ListDeployablesOptions;
///
/// # async fn example(client: CloudDatabasesClient) -> Result<(), cloud_databases::ApiError> {
/// let response = client.list_deployables(&ListDeployablesOptions::new()).await?;
/// println!("status {}", response.status_code());
/// if let Some(list) = response.result() {
///     for deployable in &list.deployables {
///         println!("{}", deployable.kind);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    result: Option<T>,
    envelope: Envelope,
}

impl<T> DetailedResponse<T> {
    pub fn new(result: Option<T>, envelope: Envelope) -> Self {
        Self { result, envelope }
    }

    pub fn status_code(&self) -> u16 {
        self.envelope.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.envelope.headers
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.envelope.body
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Splits the response into its typed result and envelope.
    pub fn into_parts(self) -> (Option<T>, Envelope) {
        (self.result, self.envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_empty_body_detection() {
        let env = Envelope::new(200, HeaderMap::new(), Bytes::new());
        assert!(env.is_empty_body());

        let env = Envelope::new(200, HeaderMap::new(), Bytes::from_static(b"  \n"));
        assert!(env.is_empty_body());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        let env = Envelope::new(200, headers, Bytes::new());
        assert_eq!(env.content_length(), Some(0));
        assert!(env.is_empty_body());

        let env = Envelope::new(200, HeaderMap::new(), Bytes::from_static(b"{}"));
        assert!(!env.is_empty_body());
    }

    #[test]
    fn test_success_range() {
        assert!(Envelope::new(202, HeaderMap::new(), Bytes::new()).is_success());
        assert!(!Envelope::new(301, HeaderMap::new(), Bytes::new()).is_success());
        assert!(!Envelope::new(199, HeaderMap::new(), Bytes::new()).is_success());
    }
}
