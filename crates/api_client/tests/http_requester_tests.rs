// HttpRequester tests against a local wiremock server

use gitlab_api_client::{
    AllJobsOptions, AuthToken, BaseResource, GitlabClientError, JobScope, Jobs, PlayJobOptions,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jobs_for(server: &MockServer, token: AuthToken) -> Jobs {
    let base = BaseResource::builder()
        .host(server.uri())
        .token(token)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("build resource");
    Jobs::new(base)
}

#[tokio::test]
async fn test_list_jobs_sends_auth_and_array_scopes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/pipelines/2/jobs"))
        .and(header("private-token", "abcdefg"))
        .and(query_param("scope[]", "pending"))
        .and(query_param("scope[]", "running"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7, "status": "pending" }])))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::Private("abcdefg".to_string()));
    let options = AllJobsOptions::new()
        .with_pipeline(2)
        .with_scope([JobScope::Pending, JobScope::Running]);

    let payload = jobs.all(1, Some(options)).await.unwrap();

    assert_eq!(payload, json!([{ "id": 7, "status": "pending" }]));
}

#[tokio::test]
async fn test_play_sends_variables_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/group%2Fapp/jobs/9/play"))
        .and(header("authorization", "Bearer oauth"))
        .and(body_json(json!({
            "job_variables_attributes": [{ "key": "DEPLOY_ENV", "value": "staging" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9, "status": "pending" })))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::OAuth("oauth".to_string()));
    let options = PlayJobOptions::new().with_variable("DEPLOY_ENV", "staging");

    let payload = jobs.play_with_variables("group/app", 9, options).await.unwrap();

    assert_eq!(payload["status"], "pending");
}

#[tokio::test]
async fn test_trace_is_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/jobs/2/trace"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Running with gitlab-runner\nJob succeeded\n"))
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::Private("abcdefg".to_string()));

    let payload = jobs.show_log(1, 2).await.unwrap();

    assert_eq!(payload, json!("Running with gitlab-runner\nJob succeeded\n"));
}

#[tokio::test]
async fn test_connected_job_uses_job_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/job/allowed_agents"))
        .and(header("job-token", "ci-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed_agents": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::Job("ci-token".to_string()));

    let payload = jobs.show_connected_job_k8s_agents().await.unwrap();

    assert_eq!(payload, json!({ "allowed_agents": [] }));
}

#[tokio::test]
async fn test_http_errors_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/1/jobs/404/cancel"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "404 Job Not Found" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/1/jobs/2/retry"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "403 Forbidden" })))
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::Private("abcdefg".to_string()));

    match jobs.cancel(1, 404).await.unwrap_err() {
        GitlabClientError::ResourceNotFound { resource } => assert_eq!(resource, "404 Job Not Found"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = jobs.retry(1, 2).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_missing_job_token_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/job"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let jobs = jobs_for(&server, AuthToken::Private("abcdefg".to_string()));

    let err = jobs.show_connected_job().await.unwrap_err();
    assert!(matches!(err, GitlabClientError::MissingRequiredHeader(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_a_network_error() {
    let base = BaseResource::builder()
        .host("http://127.0.0.1:9")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = Jobs::new(base).show(1, 2).await.unwrap_err();

    assert!(err.is_retryable(), "unexpected error: {err:?}");
}
