//
//  cloud-databases
//  config/regions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Service URL Resolution
//!
//! The service is reachable at one endpoint per region, all derived from the
//! template `https://api.{region}.databases.cloud.ibm.com/v5/ibm`.
//!
//! This module provides:
//!
//! - [`service_url_for_region`]: canonical URL for a known region
//! - [`construct_service_url`]: template substitution with defaults
//! - [`validate_service_url`]: syntax checks applied to every service URL
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use cloud_databases::config::{construct_service_url, service_url_for_region, DEFAULT_SERVICE_URL};
//!
//! assert_eq!(
//!     service_url_for_region("eu-de").unwrap(),
//!     "https://api.eu-de.databases.cloud.ibm.com/v5/ibm"
//! );
//! assert!(service_url_for_region("mars-north").is_err());
//!
//! let url = construct_service_url(&HashMap::new()).unwrap();
//! assert_eq!(url, DEFAULT_SERVICE_URL);
//! ```

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use url::Url;

use crate::api::common::ApiError;

/// Region used when none is given.
pub const DEFAULT_REGION: &str = "us-south";

/// Parameterized service URL; `{region}` is the only variable.
pub const SERVICE_URL_TEMPLATE: &str = "https://api.{region}.databases.cloud.ibm.com/v5/ibm";

/// Service URL of the default region.
pub const DEFAULT_SERVICE_URL: &str = "https://api.us-south.databases.cloud.ibm.com/v5/ibm";

const URL_VARIABLES: &[(&str, &str)] = &[("region", DEFAULT_REGION)];

static REGION_URLS: Lazy<BTreeMap<&'static str, String>> = Lazy::new(|| {
    [
        "us-south", "us-east", "ca-tor", "br-sao", "eu-gb", "eu-de", "eu-es", "au-syd", "jp-tok",
        "jp-osa", "in-che",
    ]
    .into_iter()
    .map(|region| (region, SERVICE_URL_TEMPLATE.replace("{region}", region)))
    .collect()
});

/// Returns the canonical service URL for a known region.
///
/// # Errors
///
/// Returns a `Configuration` error naming the region if it is unknown.
pub fn service_url_for_region(region: &str) -> Result<String, ApiError> {
    REGION_URLS
        .get(region)
        .cloned()
        .ok_or_else(|| ApiError::configuration(format!("no such region: '{region}'")))
}

/// Names of the regions with a known endpoint.
pub fn known_regions() -> Vec<&'static str> {
    REGION_URLS.keys().copied().collect()
}

/// Builds a service URL from the template.
///
/// Variables not supplied take their default value. Names are
/// case-sensitive.
///
/// # Errors
///
/// Returns a `Validation` error if a supplied name is not a template
/// variable.
pub fn construct_service_url(variables: &HashMap<String, String>) -> Result<String, ApiError> {
    for name in variables.keys() {
        if !URL_VARIABLES.iter().any(|(known, _)| *known == name.as_str()) {
            return Err(ApiError::validation(format!(
                "'{name}' is an invalid variable name; valid names are: {}",
                URL_VARIABLES
                    .iter()
                    .map(|(known, _)| *known)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    }

    let mut url = SERVICE_URL_TEMPLATE.to_string();
    for &(name, default) in URL_VARIABLES {
        let value = variables.get(name).map(String::as_str).unwrap_or(default);
        url = url.replace(&format!("{{{name}}}"), value);
    }
    Ok(url)
}

/// Checks a service URL and returns its normalized form.
///
/// Surrounding whitespace and trailing slashes are stripped. The URL must
/// not be wrapped in `{`, `}` or `"`, must parse, must use `http` or
/// `https`, and must name a host.
pub fn validate_service_url(url: &str) -> Result<String, ApiError> {
    let url = normalize_service_url(url);
    if has_bad_first_or_last_char(&url) {
        return Err(ApiError::validation(
            "the service URL is invalid; remove any surrounding {, } or \" characters",
        ));
    }

    let parsed = Url::parse(&url)
        .map_err(|err| ApiError::validation(format!("the service URL '{url}' is invalid: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::validation(format!(
            "the service URL '{url}' must use http or https"
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::validation(format!(
            "the service URL '{url}' has no host"
        )));
    }

    Ok(url)
}

/// Trims whitespace and trailing slashes.
pub fn normalize_service_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Returns `true` if the value is wrapped in characters that usually come
/// from copying it out of a JSON document.
pub fn has_bad_first_or_last_char(value: &str) -> bool {
    value.starts_with('{')
        || value.starts_with('"')
        || value.ends_with('}')
        || value.ends_with('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;

    #[test]
    fn test_region_lookup() {
        assert_eq!(service_url_for_region(DEFAULT_REGION).unwrap(), DEFAULT_SERVICE_URL);
        assert!(known_regions().contains(&"jp-tok"));

        let err = service_url_for_region("US-SOUTH").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains("US-SOUTH"));
    }

    #[test]
    fn test_construct_with_variables() {
        let mut variables = HashMap::new();
        variables.insert("region".to_string(), "au-syd".to_string());
        assert_eq!(
            construct_service_url(&variables).unwrap(),
            "https://api.au-syd.databases.cloud.ibm.com/v5/ibm"
        );
    }

    #[test]
    fn test_construct_rejects_unknown_variable() {
        let mut variables = HashMap::new();
        variables.insert("Region".to_string(), "au-syd".to_string());
        let err = construct_service_url(&variables).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("'Region' is an invalid variable name"));
    }

    #[test]
    fn test_validate_service_url() {
        assert_eq!(
            validate_service_url(" https://example.com/v5/ibm/ ").unwrap(),
            "https://example.com/v5/ibm"
        );
        assert!(validate_service_url("{https://example.com}").is_err());
        assert!(validate_service_url("\"https://example.com\"").is_err());
        assert!(validate_service_url("not a url").is_err());
        assert!(validate_service_url("ftp://example.com").is_err());
    }
}
