//! Client and repository behavior against a mocked Firestore endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobboard_firestore::{
    ApplicationRepository, FirestoreClient, FirestoreConfig, FirestoreError, JobRepository, RetryConfig,
};
use jobboard_models::query::{ApplicationFilter, JobFilter};
use jobboard_models::{Application, JobId, JobStatus, UserId};

async fn client_for(server: &MockServer) -> FirestoreClient {
    let config = FirestoreConfig {
        project_id: "demo-jobs".to_string(),
        database_id: "(default)".to_string(),
        emulator_host: Some(server.uri()),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    };
    FirestoreClient::new(config).await.unwrap()
}

fn job_document(id: &str, status: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo-jobs/databases/(default)/documents/jobs/{}", id),
        "fields": {
            "company_id": {"stringValue": "c1"},
            "title": {"stringValue": "Platform Engineer"},
            "description": {"stringValue": "Keep the lights on for everyone."},
            "employment_type": {"stringValue": "full_time"},
            "experience_level": {"stringValue": "senior"},
            "salary_min": {"integerValue": "90000"},
            "salary_max": {"nullValue": null},
            "salary_currency": {"stringValue": "USD"},
            "status": {"stringValue": status},
            "created_at": {"timestampValue": "2024-03-01T10:00:00Z"},
            "updated_at": {"timestampValue": "2024-03-02T10:00:00Z"}
        }
    })
}

#[tokio::test]
async fn test_missing_document_reads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/documents/jobs/nope$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"status": "NOT_FOUND"}})))
        .mount(&server)
        .await;

    let repo = JobRepository::new(client_for(&server).await);
    assert!(repo.get(&JobId::from("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_parses_job_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/documents/jobs/j1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_document("j1", "published")))
        .mount(&server)
        .await;

    let repo = JobRepository::new(client_for(&server).await);
    let job = repo.get(&JobId::from("j1")).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Published);
    assert_eq!(job.salary_min, Some(90_000));
    assert_eq!(job.salary_max, None);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/documents/jobs/j1$"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/documents/jobs/j1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_document("j1", "draft")))
        .mount(&server)
        .await;

    let repo = JobRepository::new(client_for(&server).await);
    let job = repo.get(&JobId::from("j1")).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Draft);
}

#[tokio::test]
async fn test_duplicate_application_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents/applications$"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": {"status": "ALREADY_EXISTS"}})))
        .mount(&server)
        .await;

    let repo = ApplicationRepository::new(client_for(&server).await);
    let app = Application::new(JobId::from("j1"), UserId::from("u1"), None, None, chrono::Utc::now());
    let err = repo.create(&app).await.unwrap_err();
    assert!(matches!(err, FirestoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_list_sends_equality_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:runQuery$"))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{"collectionId": "jobs"}],
                "where": {"fieldFilter": {"field": {"fieldPath": "status"}, "op": "EQUAL", "value": {"stringValue": "published"}}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": job_document("a", "published"), "readTime": "2024-03-03T00:00:00Z"},
            {"document": job_document("b", "published"), "readTime": "2024-03-03T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let repo = JobRepository::new(client_for(&server).await);
    let filter = JobFilter {
        status: Some(JobStatus::Published),
        ..Default::default()
    };
    let jobs = repo.list(&filter).await.unwrap();
    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_empty_job_set_skips_the_query() {
    // No mocks mounted: any request would fail the call
    let server = MockServer::start().await;
    let repo = ApplicationRepository::new(client_for(&server).await);
    let filter = ApplicationFilter {
        job_ids: Some(vec![]),
        ..Default::default()
    };
    assert!(repo.list(&filter).await.unwrap().is_empty());
}
