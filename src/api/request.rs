//
//  cloud-databases
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Builder
//!
//! Turns validated [`RequestParams`] and an [`Operation`] into an
//! [`HttpRequest`]:
//!
//! 1. **Path**: each template slot is replaced by its percent-encoded value
//!    and the result is appended to the service URL.
//! 2. **Query**: recognized, non-empty parameters in declaration order.
//! 3. **Headers**: service defaults, then SDK headers, then descriptor
//!    headers, then caller headers (caller wins). `Accept` is always
//!    `application/json`.
//! 4. **Body**: JSON when the descriptor declares one and a field is set,
//!    gzip-compressed above the configured threshold.

use std::io::Write;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_ENCODING, CONTENT_TYPE, USER_AGENT,
};
use url::Url;

use crate::api::common::ApiError;
use crate::api::operation::{Operation, RequestParams};
use crate::api::transport::HttpRequest;

/// Header carrying the SDK analytics string.
pub const ANALYTICS_HEADER: &str = "X-IBMCloud-SDK-Analytics";

/// Default size above which request bodies are compressed.
pub const DEFAULT_GZIP_THRESHOLD: usize = 1024;

/// Service-level inputs to request building.
#[derive(Debug, Clone)]
pub struct BuildSettings<'a> {
    pub service_name: &'a str,
    pub default_headers: &'a HeaderMap,
    pub user_agent: &'a str,
    /// Compression threshold when the service flag is on.
    pub gzip_threshold: Option<usize>,
}

/// Builds the outgoing request for one call.
pub fn build_request(
    operation: &Operation,
    params: &RequestParams,
    service_url: &Url,
    settings: &BuildSettings<'_>,
) -> Result<HttpRequest, ApiError> {
    let mut url = resolve_path(operation, params, service_url)?;
    append_query(operation, params, &mut url);

    let mut headers = build_headers(operation, params, settings)?;
    let body = build_body(operation, params, settings, &mut headers)?;

    Ok(HttpRequest {
        method: operation.method,
        url,
        headers,
        body,
    })
}

fn resolve_path(
    operation: &Operation,
    params: &RequestParams,
    service_url: &Url,
) -> Result<Url, ApiError> {
    let mut url = service_url.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            ApiError::configuration(format!("service URL '{service_url}' cannot carry a path"))
        })?;
        segments.pop_if_empty();

        for segment in operation.path.split('/').filter(|segment| !segment.is_empty()) {
            match segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
                Some(name) => {
                    let value = params.path_value(name).ok_or_else(|| {
                        ApiError::validation(format!(
                            "{}: path slot '{{{name}}}' is not bound",
                            operation.id
                        ))
                    })?;
                    segments.push(value);
                }
                None => {
                    segments.push(segment);
                }
            }
        }
    }
    Ok(url)
}

fn append_query(operation: &Operation, params: &RequestParams, url: &mut Url) {
    let pairs: Vec<_> = params
        .query_pairs()
        .iter()
        .filter(|(name, value)| {
            let known = operation.query_params.contains(name);
            if !known {
                tracing::debug!("{}: dropping unrecognized query parameter {}", operation.id, name);
            }
            known && !value.is_empty()
        })
        .collect();

    if pairs.is_empty() {
        return;
    }

    let mut query = url.query_pairs_mut();
    for (name, value) in pairs {
        query.append_pair(name, value);
    }
}

fn build_headers(
    operation: &Operation,
    params: &RequestParams,
    settings: &BuildSettings<'_>,
) -> Result<HeaderMap, ApiError> {
    let mut headers = settings.default_headers.clone();

    if !headers.contains_key(USER_AGENT) {
        headers.insert(USER_AGENT, header_value(settings.user_agent)?);
    }
    headers.insert(
        HeaderName::from_static("x-ibmcloud-sdk-analytics"),
        header_value(&format!(
            "service_name={};service_version=V5;operation_id={}",
            settings.service_name, operation.id
        ))?,
    );

    for (name, value) in params.header_pairs() {
        if !operation.header_params.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            tracing::debug!("{}: dropping unrecognized header parameter {}", operation.id, name);
            continue;
        }
        if value.is_empty() {
            continue;
        }
        headers.insert(header_name(name)?, header_value(value)?);
    }

    for (name, value) in params.caller_headers() {
        tracing::trace!("{}: caller header {}", operation.id, name);
        headers.insert(header_name(name)?, header_value(value)?);
    }

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn build_body(
    operation: &Operation,
    params: &RequestParams,
    settings: &BuildSettings<'_>,
    headers: &mut HeaderMap,
) -> Result<Option<Bytes>, ApiError> {
    let Some(body) = params.body() else {
        return Ok(None);
    };
    if !operation.json_body {
        tracing::debug!("{}: ignoring body on an operation without one", operation.id);
        return Ok(None);
    }

    let payload = serde_json::to_vec(body).map_err(|err| {
        ApiError::validation(format!("request body could not be serialized: {err}"))
    })?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let threshold = match (settings.gzip_threshold, operation.gzip) {
        (Some(threshold), _) => Some(threshold),
        (None, true) => Some(DEFAULT_GZIP_THRESHOLD),
        (None, false) => None,
    };

    match threshold {
        Some(threshold) if payload.len() > threshold => {
            let compressed = gzip(&payload)?;
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            Ok(Some(Bytes::from(compressed)))
        }
        _ => Ok(Some(Bytes::from(payload))),
    }
}

/// Compresses a payload with gzip.
pub fn gzip(payload: &[u8]) -> Result<Vec<u8>, ApiError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload)
        .and_then(|_| encoder.finish())
        .map_err(|err| ApiError::validation(format!("request body could not be compressed: {err}")))
}

fn header_name(name: &str) -> Result<HeaderName, ApiError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::validation(format!("invalid header name '{name}'")))
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::validation("header value contains invalid characters"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::HttpMethod;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Read;

    const COMPLETE_CONNECTION: Operation = Operation {
        id: "CompleteConnection",
        method: HttpMethod::Post,
        path: "/deployments/{id}/users/{user_type}/{user_id}/connections/{endpoint_type}",
        path_params: &["id", "user_type", "user_id", "endpoint_type"],
        query_params: &[],
        header_params: &[],
        required_headers: &[],
        json_body: true,
        success: &[200],
        gzip: false,
    };

    const DEPLOYMENT_CAPABILITY: Operation = Operation {
        id: "GetDeploymentCapability",
        method: HttpMethod::Get,
        path: "/deployments/{id}/capability/{capability_id}",
        path_params: &["id", "capability_id"],
        query_params: &["target_platform", "target_location", "host_flavor"],
        header_params: &[],
        required_headers: &[],
        json_body: false,
        success: &[200],
        gzip: false,
    };

    fn settings(defaults: &HeaderMap, gzip_threshold: Option<usize>) -> BuildSettings<'_> {
        BuildSettings {
            service_name: "cloud_databases",
            default_headers: defaults,
            user_agent: "cloud-databases-rust-sdk/test",
            gzip_threshold,
        }
    }

    fn base() -> Url {
        Url::parse("https://api.us-south.databases.cloud.ibm.com/v5/ibm").unwrap()
    }

    #[test]
    fn test_path_slots_are_escaped() {
        let params = RequestParams::new()
            .path("id", "crn:v1:bluemix:public:databases-for-postgresql:us-south:a/274074::")
            .path("user_type", "database")
            .path("user_id", "admin")
            .path("endpoint_type", "public");
        let defaults = HeaderMap::new();
        let request = build_request(&COMPLETE_CONNECTION, &params, &base(), &settings(&defaults, None)).unwrap();

        assert_eq!(
            request.url.path(),
            "/v5/ibm/deployments/crn:v1:bluemix:public:databases-for-postgresql:us-south:a%2F274074::/users/database/admin/connections/public"
        );
        assert!(request.body.is_none());
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_query_filtering_and_order() {
        let params = RequestParams::new()
            .path("id", "dep")
            .path("capability_id", "versions")
            .query("target_platform", Some("classic"))
            .query("host_flavor", Some(""))
            .query("unknown", Some("x"))
            .query("target_location", Some("eu-de"));
        let defaults = HeaderMap::new();
        let request =
            build_request(&DEPLOYMENT_CAPABILITY, &params, &base(), &settings(&defaults, None)).unwrap();

        assert_eq!(request.url.query(), Some("target_platform=classic&target_location=eu-de"));
    }

    #[test]
    fn test_header_precedence() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-trace", HeaderValue::from_static("default"));
        defaults.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        let mut caller = HashMap::new();
        caller.insert("X-Trace".to_string(), "caller".to_string());
        caller.insert("Accept".to_string(), "application/xml".to_string());

        let params = RequestParams::new()
            .path("id", "dep")
            .path("capability_id", "versions")
            .extra_headers(&caller);
        let request =
            build_request(&DEPLOYMENT_CAPABILITY, &params, &base(), &settings(&defaults, None)).unwrap();

        assert_eq!(request.headers.get("x-trace").unwrap(), "caller");
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(
            request.headers.get(ANALYTICS_HEADER).unwrap(),
            "service_name=cloud_databases;service_version=V5;operation_id=GetDeploymentCapability"
        );
        assert_eq!(request.headers.get(USER_AGENT).unwrap(), "cloud-databases-rust-sdk/test");
    }

    #[test]
    fn test_json_body_without_compression() {
        let params = RequestParams::new()
            .path("id", "dep")
            .path("user_type", "database")
            .path("user_id", "admin")
            .path("endpoint_type", "private")
            .json_body(&json!({"password": "s3cret"}))
            .unwrap();
        let defaults = HeaderMap::new();
        let request = build_request(&COMPLETE_CONNECTION, &params, &base(), &settings(&defaults, None)).unwrap();

        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(request.headers.get(CONTENT_ENCODING).is_none());
        assert_eq!(request.body.unwrap().as_ref(), br#"{"password":"s3cret"}"#);
    }

    #[test]
    fn test_large_body_is_gzipped() {
        let password = "p".repeat(64);
        let params = RequestParams::new()
            .path("id", "dep")
            .path("user_type", "database")
            .path("user_id", "admin")
            .path("endpoint_type", "private")
            .json_body(&json!({ "password": password }))
            .unwrap();
        let defaults = HeaderMap::new();
        let request =
            build_request(&COMPLETE_CONNECTION, &params, &base(), &settings(&defaults, Some(16))).unwrap();

        assert_eq!(request.headers.get(CONTENT_ENCODING).unwrap(), "gzip");
        let mut decoded = String::new();
        GzDecoder::new(request.body.unwrap().as_ref())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, format!(r#"{{"password":"{password}"}}"#));
    }
}
