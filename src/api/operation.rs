//
//  cloud-databases
//  api/operation.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Operation Descriptors
//!
//! Every API operation is described once by a constant [`Operation`]: its
//! method, path template, the path slots that must be bound, the query and
//! header parameters it recognizes, whether it carries a JSON body, and the
//! statuses it answers with on success.
//!
//! Per-operation option structs implement [`OperationOptions`] and turn
//! themselves into [`RequestParams`]; [`validate_request`] then checks the
//! params against the descriptor before anything touches the network.
//!
//! ## Example
//!
//! ```rust
//! use cloud_databases::api::operation::{validate_request, Operation, RequestParams};
//! use cloud_databases::api::HttpMethod;
//!
//! const GET_TASK: Operation = Operation {
//!     id: "GetTask",
//!     method: HttpMethod::Get,
//!     path: "/tasks/{id}",
//!     path_params: &["id"],
//!     query_params: &[],
//!     header_params: &[],
//!     required_headers: &[],
//!     json_body: false,
//!     success: &[200],
//!     gzip: false,
//! };
//!
//! let params = RequestParams::new().path("id", "   ");
//! assert!(validate_request(&GET_TASK, Some(&params)).is_err());
//!
//! let params = RequestParams::new().path("id", "5a0f");
//! assert!(validate_request(&GET_TASK, Some(&params)).is_ok());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::api::common::ApiError;
use crate::api::transport::HttpMethod;

static SLOT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid slot pattern"));

/// Compile-time description of one API operation's wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation identifier, reported in the SDK analytics header.
    pub id: &'static str,
    pub method: HttpMethod,
    /// Path template relative to the service URL, with `{name}` slots.
    pub path: &'static str,
    /// Path slots that must be bound to a non-empty value.
    pub path_params: &'static [&'static str],
    /// Query parameters the operation recognizes.
    pub query_params: &'static [&'static str],
    /// Header parameters the operation recognizes.
    pub header_params: &'static [&'static str],
    /// Header parameters that must be present and non-empty.
    pub required_headers: &'static [&'static str],
    pub json_body: bool,
    /// Statuses the operation answers with on success.
    pub success: &'static [u16],
    /// Compress large request bodies even when the service flag is off.
    pub gzip: bool,
}

impl Operation {
    pub fn expects(&self, status: u16) -> bool {
        self.success.contains(&status)
    }

    /// Names of the `{slot}` placeholders in the path template.
    pub fn slots(&self) -> Vec<&'static str> {
        template_slots(self.path)
    }
}

/// Names of the `{slot}` placeholders in a template, in order.
pub fn template_slots(template: &'static str) -> Vec<&'static str> {
    SLOT_PATTERN
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str())
        .collect()
}

/// Values for one call: path slots, query and header parameters, JSON body,
/// and caller-injected headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    path: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    headers: Vec<(&'static str, String)>,
    body: Option<Value>,
    extra_headers: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path.push((name, value.into()));
        self
    }

    /// Adds a string query parameter; `None` and empty strings are omitted.
    pub fn query(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.query.push((name, value.to_string()));
        }
        self
    }

    /// Adds a boolean query parameter as the literal `true` or `false`.
    pub fn query_bool(mut self, name: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.query.push((name, value.to_string()));
        }
        self
    }

    /// Adds a timestamp query parameter in ISO-8601 UTC with milliseconds.
    pub fn query_datetime(mut self, name: &'static str, value: Option<&DateTime<Utc>>) -> Self {
        if let Some(value) = value {
            self.query.push((name, format_datetime(value)));
        }
        self
    }

    /// Adds one key/value pair per non-empty element, in order.
    pub fn query_list(mut self, name: &'static str, values: &[String]) -> Self {
        for value in values.iter().filter(|value| !value.is_empty()) {
            self.query.push((name, value.clone()));
        }
        self
    }

    pub fn header(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.headers.push((name, value.to_string()));
        }
        self
    }

    /// Serializes `body` as the JSON payload.
    ///
    /// A body whose fields are all unset serializes to `{}` and is dropped,
    /// so the request goes out without a payload.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|err| {
            ApiError::validation(format!("request body could not be serialized: {err}"))
        })?;
        self.body = match value {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(other),
        };
        Ok(self)
    }

    /// Caller headers, forwarded verbatim and applied last.
    pub fn extra_headers(mut self, headers: &HashMap<String, String>) -> Self {
        let mut pairs: Vec<_> = headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        pairs.sort();
        self.extra_headers.extend(pairs);
        self
    }

    pub fn path_value(&self, name: &str) -> Option<&str> {
        lookup(&self.path, name)
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn query_pairs(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub fn header_pairs(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    pub fn caller_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

fn lookup<'a>(pairs: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Formats a timestamp the way the service expects it in query strings.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Implemented by every per-operation options struct.
pub trait OperationOptions {
    fn params(&self) -> Result<RequestParams, ApiError>;
}

impl OperationOptions for RequestParams {
    fn params(&self) -> Result<RequestParams, ApiError> {
        Ok(self.clone())
    }
}

/// Checks a call's params against its descriptor.
///
/// Fails with a `Validation` error when the options are absent, when a
/// required path slot or header is unset or blank after trimming, or when the
/// path template names a slot the descriptor does not declare.
pub fn validate_request<'a>(
    operation: &Operation,
    params: Option<&'a RequestParams>,
) -> Result<&'a RequestParams, ApiError> {
    let params = params.ok_or_else(|| {
        ApiError::validation(format!("{} options must be provided", operation.id))
    })?;

    for slot in operation.slots() {
        if !operation.path_params.contains(&slot) {
            return Err(ApiError::validation(format!(
                "{}: path slot '{{{slot}}}' has no declared parameter",
                operation.id
            )));
        }
    }

    for name in operation.path_params {
        match params.path_value(name) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(ApiError::validation(format!(
                    "{}: '{name}' must be provided and non-empty",
                    operation.id
                )))
            }
        }
    }

    for name in operation.required_headers {
        match params.header_value(name) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(ApiError::validation(format!(
                    "{}: header '{name}' must be provided and non-empty",
                    operation.id
                )))
            }
        }
    }

    Ok(params)
}
