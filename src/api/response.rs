//
//  cloud-databases
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Response decoding.
//!
//! - 2xx with an empty body: success with no result.
//! - 2xx with a body: JSON-decoded into the result type; a decode failure is a
//!   `ResponseProcessing` error that still carries the envelope.
//! - anything else: a `ServerError` carrying status, best-effort message,
//!   decoded payload and envelope.

use serde::de::DeserializeOwned;

use crate::api::common::{ApiError, DetailedResponse, Envelope};
use crate::api::operation::Operation;

pub fn decode_response<T: DeserializeOwned>(
    operation: &Operation,
    response: Envelope,
) -> Result<DetailedResponse<T>, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }

    if !operation.expects(response.status) {
        tracing::warn!(
            "{} answered {} (expected one of {:?})",
            operation.id,
            response.status,
            operation.success
        );
    }

    if response.is_empty_body() {
        return Ok(DetailedResponse::new(None, response));
    }

    match serde_json::from_slice::<T>(&response.body) {
        Ok(result) => Ok(DetailedResponse::new(Some(result), response)),
        Err(err) => Err(ApiError::response_processing(err, response)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;
    use crate::api::transport::HttpMethod;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use serde::Deserialize;

    const LIST_REGIONS: Operation = Operation {
        id: "ListRegions",
        method: HttpMethod::Get,
        path: "/regions",
        path_params: &[],
        query_params: &[],
        header_params: &[],
        required_headers: &[],
        json_body: false,
        success: &[200],
        gzip: false,
    };

    #[derive(Debug, Deserialize)]
    struct Regions {
        regions: Vec<String>,
    }

    fn envelope(status: u16, body: &'static str) -> Envelope {
        Envelope::new(status, HeaderMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_decodes_result() {
        let response =
            decode_response::<Regions>(&LIST_REGIONS, envelope(200, r#"{"regions":["us-south"]}"#)).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.result().unwrap().regions, vec!["us-south"]);
    }

    #[test]
    fn test_empty_body_is_success_without_result() {
        let response = decode_response::<Regions>(&LIST_REGIONS, envelope(200, "")).unwrap();
        assert!(response.result().is_none());
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn test_invalid_json_keeps_envelope() {
        let err = decode_response::<Regions>(&LIST_REGIONS, envelope(200, "} this is not valid json {"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseProcessing);
        assert_eq!(err.response().unwrap().status, 200);
    }

    #[test]
    fn test_non_success_is_server_error() {
        let err = decode_response::<Regions>(&LIST_REGIONS, envelope(503, r#"{"message":"down"}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.status(), 503);
        assert_eq!(err.message(), "down");
    }

    #[test]
    fn test_unexpected_success_status_still_decodes() {
        let response =
            decode_response::<Regions>(&LIST_REGIONS, envelope(202, r#"{"regions":[]}"#)).unwrap();
        assert!(response.result().unwrap().regions.is_empty());
    }
}
