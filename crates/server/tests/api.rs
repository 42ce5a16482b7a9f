//! HTTP-level tests: the real router over an in-memory database.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use db::DBService;
use serde_json::{Value, json};
use server::{AppState, app};
use services::services::auth::Authenticator;
use utils::jwt::{Claims, Role, TokenIssuer};

const SECRET: &[u8] = b"integration-test-secret-32-bytes-long!";
const ADMIN_EMAIL: &str = "office@example.com";
const ADMIN_PASSWORD: &str = "correct horse";

struct Harness {
    server: TestServer,
    db: DBService,
    token: String,
}

async fn harness() -> Harness {
    let db = DBService::new_in_memory().await.unwrap();
    let tokens = TokenIssuer::new(SECRET, Duration::hours(24), Duration::hours(168));
    let auth = Authenticator::new(db.pool.clone(), tokens, 4);
    auth.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let server = TestServer::new(app(AppState::new(db.clone(), auth))).unwrap();
    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    login.assert_status_ok();
    let token = login.json::<Value>()["token"].as_str().unwrap().to_string();

    Harness { server, db, token }
}

fn intake_body(schedule_meeting: bool) -> Value {
    json!({
        "customer": {
            "name": "A",
            "email": "a@x.com",
            "phone": "555",
            "address": "1 St",
            "city": "C",
            "state": "OR",
            "zip_code": "97000"
        },
        "project": {
            "project_name": "Deck",
            "project_type": "Addition",
            "description": "new deck",
            "meeting_date": "2026-11-03",
            "meeting_time": "10:00"
        },
        "scheduleMeeting": schedule_meeting
    })
}

async fn submit_intake(h: &Harness, schedule_meeting: bool) -> Value {
    let response = h
        .server
        .post("/api/intake")
        .authorization_bearer(&h.token)
        .json(&intake_body(schedule_meeting))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn health_reports_connected_database() {
    let h = harness().await;
    let response = h.server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["database"], "connected");
}

#[tokio::test]
async fn intake_without_meeting_returns_lead_project() {
    let h = harness().await;
    let body = submit_intake(&h, false).await;

    assert_eq!(body["success"], true);
    assert!(body["customer"]["id"].is_string());
    assert!(body["project"]["id"].is_string());
    assert!(body["document"]["id"].is_string());
    assert_eq!(body["project"]["status"], "lead");
    assert_eq!(body["document"]["document_type"], "intake_form");
    assert!(body["scheduleEvent"].is_null());
}

#[tokio::test]
async fn intake_with_meeting_creates_pending_site_visit() {
    let h = harness().await;
    let body = submit_intake(&h, true).await;

    let event = &body["scheduleEvent"];
    assert_eq!(event["status"], "pending");
    assert_eq!(event["event_type"], "site_visit");
    assert_eq!(event["attendees"], json!(["A"]));
}

#[tokio::test]
async fn intake_validation_lists_missing_fields() {
    let h = harness().await;
    let response = h
        .server
        .post("/api/intake")
        .authorization_bearer(&h.token)
        .json(&json!({ "customer": { "name": "A" }, "project": {} }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].as_array().unwrap().len() >= 9);
}

#[tokio::test]
async fn intake_project_failure_is_500_and_leaves_no_customer() {
    let h = harness().await;
    sqlx::query("DROP TABLE projects").execute(&h.db.pool).await.unwrap();

    let response = h
        .server
        .post("/api/intake")
        .authorization_bearer(&h.token)
        .json(&intake_body(false))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Failed to create project");
    let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&h.db.pool)
        .await
        .unwrap();
    assert_eq!(customers, 0);
}

#[tokio::test]
async fn protected_routes_distinguish_missing_and_bad_tokens() {
    let h = harness().await;

    let missing = h.server.get("/api/schedule").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>(), json!({ "error": "Unauthorized" }));

    let signature_start = h.token.rfind('.').unwrap() + 1;
    let mut tampered = h.token.clone();
    let flipped = if tampered[signature_start..].starts_with('A') { "B" } else { "A" };
    tampered.replace_range(signature_start..signature_start + 1, flipped);
    let bad = h
        .server
        .get("/api/schedule")
        .authorization_bearer(&tampered)
        .await;
    bad.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(bad.json::<Value>(), json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let h = harness().await;
    let issuer = TokenIssuer::new(SECRET, Duration::hours(24), Duration::hours(168));
    let now = chrono::Utc::now().timestamp();
    let expired = issuer
        .sign(&Claims {
            sub: "someone".to_string(),
            role: Role::Admin,
            email: None,
            project_id: None,
            iat: now - 7200,
            exp: now - 3600,
        })
        .unwrap();

    let response = h
        .server
        .get("/api/customers")
        .authorization_bearer(&expired)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid token");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let h = harness().await;
    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid credentials");
}

#[tokio::test]
async fn schedule_status_lifecycle_over_http() {
    let h = harness().await;
    let body = submit_intake(&h, true).await;
    let event_id = body["scheduleEvent"]["id"].as_str().unwrap().to_string();

    let patch = |status: &str| json!({ "id": event_id, "status": status });

    let accepted = h
        .server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&patch("accepted"))
        .await;
    accepted.assert_status_ok();
    assert_eq!(accepted.json::<Value>()["status"], "accepted");

    let completed = h
        .server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&patch("completed"))
        .await;
    completed.assert_status_ok();

    let reopened = h
        .server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&patch("pending"))
        .await;
    reopened.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        reopened.json::<Value>()["details"],
        json!({ "from": "completed", "to": "pending" })
    );
}

#[tokio::test]
async fn pending_filter_only_returns_pending_events() {
    let h = harness().await;
    let first = submit_intake(&h, true).await;
    submit_intake(&h, true).await;
    let accepted_id = first["scheduleEvent"]["id"].as_str().unwrap();

    h.server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&json!({ "id": accepted_id, "status": "accepted" }))
        .await
        .assert_status_ok();

    let response = h
        .server
        .get("/api/schedule")
        .add_query_param("status", "pending")
        .authorization_bearer(&h.token)
        .await;
    response.assert_status_ok();
    let events = response.json::<Value>();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["status"], "pending");
    assert_eq!(events[0]["customer_name"], "A");
}

#[tokio::test]
async fn calendar_places_site_visit_on_its_day() {
    let h = harness().await;
    submit_intake(&h, true).await;

    let response = h
        .server
        .get("/api/schedule/calendar")
        .add_query_param("year", 2026)
        .add_query_param("month", 11)
        .authorization_bearer(&h.token)
        .await;
    response.assert_status_ok();
    let days = response.json::<Value>();
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 42);
    let visit_day = days.iter().find(|d| d["date"] == "2026-11-03").unwrap();
    assert_eq!(visit_day["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn customer_portal_sees_only_its_project() {
    let h = harness().await;
    let body = submit_intake(&h, false).await;
    let project_id = body["project"]["id"].as_str().unwrap().to_string();

    let issued = h
        .server
        .post(&format!("/api/projects/{project_id}/access-code"))
        .authorization_bearer(&h.token)
        .await;
    issued.assert_status_ok();
    let code = issued.json::<Value>()["access_code"]
        .as_str()
        .unwrap()
        .to_string();

    let login = h
        .server
        .post("/api/auth/customer")
        .json(&json!({ "address": "1 st", "access_code": code }))
        .await;
    login.assert_status_ok();
    let customer_token = login.json::<Value>()["token"].as_str().unwrap().to_string();

    let portal = h
        .server
        .get("/api/portal/project")
        .authorization_bearer(&customer_token)
        .await;
    portal.assert_status_ok();
    let detail = portal.json::<Value>();
    assert_eq!(detail["project"]["id"], project_id.as_str());
    assert_eq!(detail["documents"].as_array().unwrap().len(), 1);

    // Customer tokens do not open admin routes.
    h.server
        .get("/api/customers")
        .authorization_bearer(&customer_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_a_customer_removes_their_projects() {
    let h = harness().await;
    let body = submit_intake(&h, true).await;
    let customer_id = body["customer"]["id"].as_str().unwrap();
    let project_id = body["project"]["id"].as_str().unwrap();

    h.server
        .delete(&format!("/api/customers/{customer_id}"))
        .authorization_bearer(&h.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    h.server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&h.token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn professionals_directory_crud() {
    let h = harness().await;
    let created = h
        .server
        .post("/api/professionals")
        .authorization_bearer(&h.token)
        .json(&json!({ "name": "Sam Sparks", "trade": "Electrical" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_str().unwrap().to_string();

    let listed = h
        .server
        .get("/api/professionals")
        .authorization_bearer(&h.token)
        .await;
    listed.assert_status_ok();
    assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);

    h.server
        .delete(&format!("/api/professionals/{id}"))
        .authorization_bearer(&h.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_requests_get_the_json_error_envelope() {
    let h = harness().await;
    let body = submit_intake(&h, true).await;
    let event_id = body["scheduleEvent"]["id"].as_str().unwrap();

    let bad_status = h
        .server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&json!({ "id": event_id, "status": "reopened" }))
        .await;
    bad_status.assert_status(StatusCode::BAD_REQUEST);
    let error = bad_status.json::<Value>();
    assert_eq!(error["error"], "Validation failed");
    assert!(error["details"][0].as_str().unwrap().contains("reopened"));

    let bad_filter = h
        .server
        .get("/api/schedule")
        .add_query_param("status", "bogus")
        .authorization_bearer(&h.token)
        .await;
    bad_filter.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_filter.json::<Value>()["error"], "Validation failed");

    let bad_id = h
        .server
        .get("/api/customers/not-a-uuid")
        .authorization_bearer(&h.token)
        .await;
    bad_id.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json::<Value>()["error"], "Validation failed");
}

#[tokio::test]
async fn updates_reject_blank_required_fields_and_clear_blank_optional_ones() {
    let h = harness().await;
    let body = submit_intake(&h, true).await;
    let customer_id = body["customer"]["id"].as_str().unwrap();
    let event_id = body["scheduleEvent"]["id"].as_str().unwrap();

    let blank_name = h
        .server
        .patch(&format!("/api/customers/{customer_id}"))
        .authorization_bearer(&h.token)
        .json(&json!({ "name": "" }))
        .await;
    blank_name.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(blank_name.json::<Value>()["details"], json!(["name cannot be blank"]));

    let blank_title = h
        .server
        .patch("/api/schedule")
        .authorization_bearer(&h.token)
        .json(&json!({ "id": event_id, "title": " " }))
        .await;
    blank_title.assert_status(StatusCode::BAD_REQUEST);

    let with_phone = h
        .server
        .patch(&format!("/api/customers/{customer_id}"))
        .authorization_bearer(&h.token)
        .json(&json!({ "secondary_phone": "555-0199" }))
        .await;
    with_phone.assert_status_ok();
    assert_eq!(with_phone.json::<Value>()["secondary_phone"], "555-0199");

    let cleared = h
        .server
        .patch(&format!("/api/customers/{customer_id}"))
        .authorization_bearer(&h.token)
        .json(&json!({ "secondary_phone": "" }))
        .await;
    cleared.assert_status_ok();
    let customer = cleared.json::<Value>();
    assert!(customer["secondary_phone"].is_null());
    assert_eq!(customer["name"], "A");
}

#[tokio::test]
async fn dates_at_the_end_of_the_calendar_are_validation_errors() {
    let h = harness().await;

    let mut body = intake_body(true);
    body["project"]["meeting_date"] = json!("+262142-12-31");
    body["project"]["meeting_time"] = json!("23:30");
    let intake = h
        .server
        .post("/api/intake")
        .authorization_bearer(&h.token)
        .json(&body)
        .await;
    intake.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        intake.json::<Value>()["details"],
        json!(["project.meeting_date is out of range"])
    );

    for (year, month) in [(-262143, 1), (262142, 12)] {
        let calendar = h
            .server
            .get("/api/schedule/calendar")
            .add_query_param("year", year)
            .add_query_param("month", month)
            .authorization_bearer(&h.token)
            .await;
        calendar.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(calendar.json::<Value>()["error"], "Validation failed");
    }
}
