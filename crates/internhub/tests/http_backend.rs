//! Contract checks for the HTTP backend against a mock placement API.

use std::collections::BTreeMap;

use internhub::backend::{BackendError, HttpBackend, PlacementBackend};
use internhub::config::ApiConfig;
use internhub::workflows::jobs::{FieldKind, JobId, JobStatus};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer, token: Option<&str>) -> HttpBackend {
    let config = ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        auth_token: token.map(str::to_string),
        timeout_secs: 5,
    };
    HttpBackend::new(&config).expect("client builds")
}

#[tokio::test]
async fn current_plan_sends_bearer_token_and_decodes_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/current-plan"))
        .and(header("authorization", "Bearer intern-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "purchases": [{
                "_id": "p-1",
                "purchaseCategory": "COURSE",
                "paymentStatus": "SUCCESS",
                "createdAt": "2025-01-05T08:00:00Z",
                "courseDetails": {"courseType": "data-science", "totalSessions": 30, "liveSessions": 8}
            }],
            "jobCredits": 0,
            "purchasedCourses": [{"courseType": "data-science"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("intern-token"));
    assert_eq!(backend.base_url(), format!("{}/api", server.uri()));
    let plan = backend.current_plan().await.expect("plan loads");

    assert_eq!(plan.purchases.len(), 1);
    assert_eq!(plan.job_credits, Some(0));
    assert_eq!(
        plan.purchases[0]
            .course_details
            .as_ref()
            .map(|course| course.live_sessions),
        Some(8)
    );
}

#[tokio::test]
async fn open_jobs_filters_on_status_and_accepts_wrapped_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .and(query_param("status", "Open"))
        .and(query_param("isActive", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{
                "_id": "job-1",
                "title": "Data Analyst Intern",
                "companyName": "Northwind",
                "salary": {"min": 300000, "max": 450000},
                "status": "Open",
                "isActive": true,
                "requiredSkills": ["sql", "excel"]
            }]
        })))
        .mount(&server)
        .await;

    let jobs = backend_for(&server, None)
        .open_jobs()
        .await
        .expect("jobs load");

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, JobId::from("job-1"));
    assert_eq!(jobs[0].status, JobStatus::Open);
    assert_eq!(jobs[0].salary.max, Some(450_000));
    assert_eq!(jobs[0].required_skills, vec!["sql", "excel"]);
}

#[tokio::test]
async fn missing_application_form_means_no_custom_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/job-2/application-form"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/job-3/application-form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{"name": "email", "label": "Email", "type": "email", "required": true}]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let empty = backend
        .application_form(&JobId::from("job-2"))
        .await
        .expect("404 maps to empty form");
    assert!(empty.fields.is_empty());

    let form = backend
        .application_form(&JobId::from("job-3"))
        .await
        .expect("form loads");
    assert_eq!(form.fields[0].kind, FieldKind::Email);
}

#[tokio::test]
async fn apply_posts_answers_and_reads_remaining_credits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/job-4/apply"))
        .and(body_json(json!({"answers": {"email": "intern@example.com"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Application submitted",
            "creditsRemaining": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut answers = BTreeMap::new();
    answers.insert("email".to_string(), "intern@example.com".to_string());
    let response = backend_for(&server, Some("t"))
        .apply(&JobId::from("job-4"), &answers)
        .await
        .expect("apply succeeds");

    assert_eq!(response.message.as_deref(), Some("Application submitted"));
    assert_eq!(response.credits_remaining, Some(4));
}

#[tokio::test]
async fn apply_success_with_empty_body_is_still_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/job-5/apply"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = backend_for(&server, None)
        .apply(&JobId::from("job-5"), &BTreeMap::new())
        .await
        .expect("apply succeeds");
    assert_eq!(response.message, None);
}

#[tokio::test]
async fn error_statuses_carry_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/job-6/apply"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Salary exceeds your package limit"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/applied"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let err = backend
        .apply(&JobId::from("job-6"), &BTreeMap::new())
        .await
        .expect_err("rejected");
    assert_eq!(
        err,
        BackendError::Rejected {
            status: 400,
            message: Some("Salary exceeds your package limit".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Salary exceeds your package limit");

    let err = backend.applied_jobs().await.expect_err("unauthorized");
    assert_eq!(err, BackendError::Unauthorized { message: None });
}

#[tokio::test]
async fn applied_jobs_reads_application_objects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/applied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "app-1", "jobId": "job-1", "status": "Applied"},
            "job-2"
        ])))
        .mount(&server)
        .await;

    let applied = backend_for(&server, None)
        .applied_jobs()
        .await
        .expect("applied loads");
    assert_eq!(applied, vec![JobId::from("job-1"), JobId::from("job-2")]);
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/current-plan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server, None)
        .current_plan()
        .await
        .expect_err("decode fails");
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        auth_token: None,
        timeout_secs: 2,
    };
    let backend = HttpBackend::new(&config).expect("client builds");
    let err = backend.open_jobs().await.expect_err("nothing listens");
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn job_ids_are_encoded_as_single_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/team%2F42%3Fref=x/apply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server, None)
        .apply(&JobId::from("team/42?ref=x"), &BTreeMap::new())
        .await
        .expect("apply reaches the encoded route");
    assert_eq!(response.message.as_deref(), Some("ok"));
}
