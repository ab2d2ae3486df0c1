//
//  cloud-databases
//  tests/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! End-to-end tests against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use cloud_databases::api::v5::{
    AllowlistEntry, CreateDatabaseUserOptions, DatabaseUser, GetConnectionOptions,
    GetDeploymentInfoOptions, ListDeployablesOptions, SetAllowlistOptions,
    SetDatabaseInplaceVersionUpgradeOptions, UpdateUserOptions, UserPrototype, UserUpdate,
};
use cloud_databases::api::{Backoff, RetryPolicy};
use cloud_databases::auth::{BasicAuthenticator, NoAuthAuthenticator};
use cloud_databases::config::EnvSnapshot;
use cloud_databases::{CloudDatabasesClient, ErrorKind, ServiceOptions};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &Server) -> CloudDatabasesClient {
    init_logging();
    CloudDatabasesClient::new(
        ServiceOptions::new()
            .with_url(format!("{}/v5/ibm", server.url()))
            .with_authenticator(Arc::new(NoAuthAuthenticator)),
    )
    .unwrap()
}

fn fast_retries(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO).with_backoff(Backoff {
        base: Duration::from_millis(10),
        factor: 1.0,
        max: Duration::from_millis(50),
        jitter: 0.0,
    })
}

#[tokio::test]
async fn test_list_deployables() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v5/ibm/deployables")
        .match_header("accept", "application/json")
        .match_header(
            "x-ibmcloud-sdk-analytics",
            "service_name=cloud_databases;service_version=V5;operation_id=ListDeployables",
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"deployables":[{"type":"postgresql","versions":[{"version":"16","status":"stable","is_preferred":true,"transitions":[]}]}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    let deployables = &response.result().unwrap().deployables;
    assert_eq!(deployables[0].kind, "postgresql");
    assert_eq!(deployables[0].versions[0].version, "16");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_id_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .get_deployment_info(&GetDeploymentInfoOptions::new(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_keeps_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/v5/ibm/deployments/dep/users/database/alice")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errors":[{"code":"not_found","message":"user not found"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_retry_policy(fast_retries(3));

    let options = UpdateUserOptions::new("dep", "database", "alice").with_user(UserUpdate {
        password: Some("n3w-passw0rd".to_string()),
        role: None,
    });
    let err = client.update_user(&options).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(err.status(), 404);
    assert_eq!(err.message(), "user not found");
    assert!(err.response().unwrap().body_text().contains("not_found"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retries_until_success() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("POST", "/v5/ibm/deployments/dep/users/database")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;
    let succeeding = server
        .mock("POST", "/v5/ibm/deployments/dep/users/database")
        .match_body(Matcher::Json(json!({
            "user": {"username": "bob", "password": "s3cret-passw0rd"}
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(r#"{"task":{"id":"task-1","description":"Creating user.","status":"running"}}"#)
        .expect(1)
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_retry_policy(fast_retries(3));

    let options = CreateDatabaseUserOptions::new("dep", "database").with_user(
        UserPrototype::Database(DatabaseUser::new("bob", "s3cret-passw0rd")),
    );
    let response = client.create_database_user(&options).await.unwrap();

    assert_eq!(response.status_code(), 202);
    let task = response.result().unwrap().task.as_ref().unwrap();
    assert_eq!(task.id, "task-1");
    failing.assert_async().await;
    succeeding.assert_async().await;
}

#[tokio::test]
async fn test_retries_give_up_with_last_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v5/ibm/deployables")
        .with_status(503)
        .with_body("service unavailable")
        .expect(2)
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_retry_policy(fast_retries(2));

    let err = client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(err.status(), 503);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_undecodable_body_is_response_processing() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v5/ibm/deployables")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResponseProcessing);
    assert_eq!(err.status(), 200);
    assert_eq!(err.response().unwrap().body_text(), "not json");
}

#[tokio::test]
async fn test_empty_body_is_success_without_result() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v5/ibm/deployments/dep")
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .get_deployment_info(&GetDeploymentInfoOptions::new("dep"))
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert!(response.result().is_none());
}

#[tokio::test]
async fn test_empty_service_url_fails_before_sending() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_service_url("").unwrap();

    let err = client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.message().contains("service URL missing"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_clone_is_independent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v5/ibm/deployables")
        .with_status(200)
        .with_body(r#"{"deployables":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut clone = client.clone();
    clone.set_service_url("").unwrap();
    clone.enable_retries(5, Duration::from_secs(10));

    assert_eq!(client.service_url(), format!("{}/v5/ibm", server.url()));
    assert!(!client.retry_policy().is_enabled());
    assert!(Arc::ptr_eq(client.authenticator(), clone.authenticator()));

    client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap();
    let err = clone
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_set_allowlist_sends_if_match() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/v5/ibm/deployments/dep/allowlists/ip_addresses")
        .match_header("if-match", "\"etag-1\"")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "ip_addresses": [{"address": "10.0.0.0/8", "description": "office"}]
        })))
        .with_status(202)
        .with_body(r#"{"task":{"id":"task-2"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let options = SetAllowlistOptions::new("dep", "\"etag-1\"")
        .with_entry(AllowlistEntry::new("10.0.0.0/8", "office"));
    let response = client.set_allowlist(&options).await.unwrap();

    assert_eq!(response.status_code(), 202);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_path_and_query_encoding() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "GET",
            "/v5/ibm/deployments/crn:v1:bluemix:public:databases-for-postgresql:us-south:a%2Fabc::/users/database/admin/connections/public",
        )
        .match_query(Matcher::UrlEncoded(
            "certificate_root".into(),
            "/var/certs".into(),
        ))
        .with_status(200)
        .with_body(r#"{"connection":{}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let options = GetConnectionOptions::new(
        "crn:v1:bluemix:public:databases-for-postgresql:us-south:a/abc::",
        "database",
        "admin",
        "public",
    )
    .with_certificate_root("/var/certs");
    let response = client.get_connection(&options).await.unwrap();

    assert!(response.result().unwrap().connection.endpoints.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_version_upgrade_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/v5/ibm/deployments/dep/version")
        .match_query(Matcher::UrlEncoded("skip_backup".into(), "true".into()))
        .match_body(Matcher::Json(json!({"version": "16"})))
        .with_status(202)
        .with_body(r#"{"task":{"id":"task-3"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let options = SetDatabaseInplaceVersionUpgradeOptions::new("dep")
        .with_version("16")
        .with_skip_backup(true);
    client
        .set_database_inplace_version_upgrade(&options)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_external_config_from_environment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v5/ibm/deployables")
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .with_status(200)
        .with_body(r#"{"deployables":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/v5/ibm", server.url());
    let env: EnvSnapshot = [
        ("IBM_CREDENTIALS_FILE", "/nonexistent/ibm-credentials.env"),
        ("CLOUD_DATABASES_URL", url.as_str()),
        ("CLOUD_DATABASES_AUTH_TYPE", "Basic"),
        ("CLOUD_DATABASES_USERNAME", "admin"),
        ("CLOUD_DATABASES_PASSWORD", "secret"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect();

    let client =
        CloudDatabasesClient::new_from_external_config_with_env(ServiceOptions::new(), &env)
            .unwrap();
    client
        .list_deployables(&ListDeployablesOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_external_config_rejects_unknown_auth_type() {
    let env: EnvSnapshot = [
        ("IBM_CREDENTIALS_FILE", "/nonexistent/ibm-credentials.env"),
        ("CLOUD_DATABASES_AUTH_TYPE", "kerberos"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect();

    let err = CloudDatabasesClient::new_from_external_config_with_env(ServiceOptions::new(), &env)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_caller_headers_are_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v5/ibm/deployables")
        .match_header("x-correlation-id", "abc123")
        .match_header("x-request-id", "req-9")
        .with_status(200)
        .with_body(r#"{"deployables":[]}"#)
        .expect(1)
        .create_async()
        .await;

    init_logging();
    let client = CloudDatabasesClient::new(
        ServiceOptions::new()
            .with_url(format!("{}/v5/ibm", server.url()))
            .with_authenticator(Arc::new(BasicAuthenticator::new("admin", "secret")))
            .with_header("X-Correlation-Id", "abc123"),
    )
    .unwrap();

    client
        .list_deployables(&ListDeployablesOptions::new().with_header("X-Request-Id", "req-9"))
        .await
        .unwrap();
    mock.assert_async().await;
}
