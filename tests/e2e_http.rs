//! End-to-end tests against a mocked Cloud Foundry API.
//!
//! Uses wiremock to stand in for the V3 API and UAA so the full request
//! path (auth, headers, error mapping, pagination, async jobs) is exercised.

use std::time::Duration;

use cfapi::{
    App, CfClient, CfConfig, CfError, Delete, Get, Job, List, Organization, PollPolicy,
    ServiceInstance,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn static_token_client(server: &MockServer) -> CfClient {
    CfClient::connect(CfConfig::with_token(&server.uri(), "test-token"))
        .await
        .unwrap()
}

fn app_json(guid: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "guid": guid,
        "name": name,
        "state": "STARTED",
        "relationships": {"space": {"data": {"guid": "space-1"}}}
    })
}

fn envelope(resources: Vec<serde_json::Value>, next: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "pagination": {
            "total_results": resources.len(),
            "total_pages": if next.is_some() { 2 } else { 1 },
            "first": {"href": "ignored"},
            "last": {"href": "ignored"},
            "next": next.map(|href| serde_json::json!({"href": href})),
            "previous": null
        },
        "resources": resources
    })
}

#[tokio::test]
async fn get_sends_bearer_token_and_parses_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/apps/app-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_json("app-1", "my-app")))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let app = App::get(&client, "app-1".to_string()).await.unwrap();

    assert_eq!(app.name, "my-app");
    assert!(app.is_started());
    assert_eq!(app.space_guid(), Some("space-1"));
}

#[tokio::test]
async fn password_grant_runs_against_uaa_before_first_request() {
    let server = MockServer::start().await;

    // UAA token endpoint: the password grant authenticates as the public
    // "cf" CLI client.
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(basic_auth("cf", ""))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "granted-token",
            "token_type": "bearer",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/apps/app-1"))
        .and(header("authorization", "Bearer granted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_json("app-1", "my-app")))
        .expect(2)
        .mount(&server)
        .await;

    let config = CfConfig::password(&server.uri(), "admin", "secret")
        .token_url(&format!("{}/oauth/token", server.uri()));
    let client = CfClient::connect(config).await.unwrap();

    // Two requests, one grant: the token is cached.
    App::get(&client, "app-1".to_string()).await.unwrap();
    App::get(&client, "app-1".to_string()).await.unwrap();
}

#[tokio::test]
async fn token_endpoint_is_discovered_from_root_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "links": {"login": {"href": format!("{}/uaa", server.uri())}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "discovered-token",
            "expires_in": 600
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/apps/app-1"))
        .and(header("authorization", "Bearer discovered-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_json("app-1", "my-app")))
        .mount(&server)
        .await;

    let config = CfConfig::client_credentials(&server.uri(), "automation", "s3cret");
    let client = CfClient::connect(config).await.unwrap();
    App::get(&client, "app-1".to_string()).await.unwrap();
}

#[tokio::test]
async fn v3_error_body_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/apps/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": [{
                "code": 10010,
                "title": "CF-ResourceNotFound",
                "detail": "App not found"
            }]
        })))
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let err = App::get(&client, "missing".to_string()).await.unwrap_err();

    match err {
        CfError::ApiError {
            title,
            detail,
            code,
            status_code,
        } => {
            assert_eq!(title, "CF-ResourceNotFound");
            assert_eq!(detail, "App not found");
            assert_eq!(code, Some(10010));
            assert_eq!(status_code, Some(404));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_maps_to_retryable_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/apps/app-1"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(serde_json::json!({"errors": []})),
        )
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let err = App::get(&client, "app-1".to_string()).await.unwrap_err();

    match &err {
        CfError::RateLimited { retry_after_secs } => assert_eq!(*retry_after_secs, Some(7)),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn list_query_filters_are_comma_separated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/organizations"))
        .and(query_param("names", "dev,prod"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            vec![serde_json::json!({"guid": "org-1", "name": "dev"})],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let query = cfapi::OrganizationListQuery {
        names: vec!["dev".to_string(), "prod".to_string()],
        ..Default::default()
    };
    let page = Organization::list_page(&client, &query, 1, 50).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.resources[0].name, "dev");
    assert!(!page.has_more);
}

#[tokio::test]
async fn list_all_follows_next_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/apps"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            vec![app_json("app-1", "one"), app_json("app-2", "two")],
            Some("https://api.example.com/v3/apps?page=2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/apps"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(vec![app_json("app-3", "three")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let apps = App::list_all(&client, &Default::default()).await.unwrap();

    assert_eq!(apps.len(), 3);
    assert_eq!(apps[2].name, "three");
}

#[tokio::test]
async fn async_delete_returns_job_guid_and_poll_completes_it() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v3/apps/app-1"))
        .respond_with(ResponseTemplate::new(202).insert_header(
            "location",
            format!("{}/v3/jobs/job-42", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    // First fetch sees the job in flight, second sees it complete.
    Mock::given(method("GET"))
        .and(path("/v3/jobs/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "guid": "job-42",
            "operation": "app.delete",
            "state": "PROCESSING"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/jobs/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "guid": "job-42",
            "operation": "app.delete",
            "state": "COMPLETE"
        })))
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;

    let job_guid = App::delete(&client, "app-1".to_string())
        .await
        .unwrap()
        .expect("async delete should return a job guid");
    assert_eq!(job_guid, "job-42");

    let policy = PollPolicy::with_max_attempts(Duration::from_millis(10), 10);
    let job = Job::poll_complete(&client, &job_guid, &policy, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(job.state, "COMPLETE");
    assert_eq!(job.operation, "app.delete");
}

#[tokio::test]
async fn failed_job_surfaces_error_detail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/jobs/job-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "guid": "job-9",
            "operation": "space.delete",
            "state": "FAILED",
            "errors": [{
                "code": 10008,
                "title": "CF-UnprocessableEntity",
                "detail": "service instances must be deleted first"
            }]
        })))
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let policy = PollPolicy::with_max_attempts(Duration::from_millis(10), 5);
    let err = Job::poll_complete(&client, "job-9", &policy, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CfError::OperationFailed(op) => {
            assert_eq!(op.guid, "job-9");
            assert_eq!(op.state, "FAILED");
            assert_eq!(
                op.description.as_deref(),
                Some("service instances must be deleted first")
            );
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn managed_service_instance_create_returns_job_guid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/service_instances"))
        .and(body_string_contains("\"type\":\"managed\""))
        .respond_with(ResponseTemplate::new(202).insert_header(
            "location",
            format!("{}/v3/jobs/job-77", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let params = cfapi::ManagedServiceInstanceCreateParams::new("my-db", "space-1", "plan-1");
    let job_guid = ServiceInstance::create_managed(&client, params).await.unwrap();

    assert_eq!(job_guid, "job-77");
}

#[tokio::test]
async fn service_instance_last_operation_polls_to_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/service_instances/si-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "guid": "si-1",
            "name": "my-db",
            "type": "managed",
            "last_operation": {
                "type": "create",
                "state": "in progress",
                "description": "provisioning"
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/service_instances/si-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "guid": "si-1",
            "name": "my-db",
            "type": "managed",
            "last_operation": {
                "type": "create",
                "state": "succeeded",
                "description": "provisioned"
            }
        })))
        .mount(&server)
        .await;

    let client = static_token_client(&server).await;
    let policy = PollPolicy::with_max_attempts(Duration::from_millis(10), 10);
    let instance =
        ServiceInstance::poll_last_operation(&client, "si-1", &policy, &CancellationToken::new())
            .await
            .unwrap();

    let last = instance.last_operation.unwrap();
    assert_eq!(last.state, "succeeded");
}
