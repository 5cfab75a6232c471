// rest_api/tests/api.rs
// End-to-end tests: the full router on an ephemeral port, an in-memory store
// and a canned generative model.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use lib::InMemoryStorage;
use models::medical::Role;
use reqwest::{Method, StatusCode};
use rest_api::ai::{AiError, GenerativeModel};
use rest_api::{build_router, AppState};
use security::{AccessPolicy, TokenIssuer};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const SECRET: &[u8] = b"integration-test-secret";

enum Reply {
    Text(&'static str),
    /// Answers after a delay, leaving room for concurrent edits.
    Slow(&'static str),
    RateLimited,
    MissingKey,
}

struct StubModel(Reply);

#[async_trait]
impl GenerativeModel for StubModel {
    fn model_name(&self) -> &str {
        "stub-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        match &self.0 {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Slow(text) => {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                Ok(text.to_string())
            }
            Reply::RateLimited => Err(AiError::RateLimited),
            Reply::MissingKey => Err(AiError::MissingApiKey),
        }
    }
}

const GOOD_REPLY: &str = "```json\n{\"diagnoses\": [\"Community-acquired pneumonia\", {\"condition\": \"Bronchitis\", \"likelihood\": \"low\"}], \"recommendedAction\": \"Chest X-ray\", \"explanation\": \"Fever with productive cough\", \"confidence\": \"78\"}\n```";

struct TestApp {
    base: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn(reply: Reply) -> TestApp {
        let state = AppState::new(
            Arc::new(InMemoryStorage::new()),
            TokenIssuer::new(SECRET, Duration::hours(1)),
            AccessPolicy::embedded().unwrap(),
            Arc::new(StubModel(reply)),
        );
        let app = build_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TestApp { base: format!("http://{}", addr), client: reqwest::Client::new() }
    }

    async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = self.client.request(method, format!("{}{}", self.base, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, path, Some(token), None).await
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, path, Some(token), Some(body)).await
    }

    async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    /// Registers a user and returns a fresh session token.
    async fn login_as(&self, role: &str, email: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "role": role, "name": format!("Test {}", role), "email": email, "password": "pw" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": email, "password": "pw" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

fn patient(national_id: &str) -> Value {
    json!({
        "nationalId": national_id,
        "name": "Maria Lopez",
        "gender": "female",
        "birthdate": "1971-03-09",
        "bloodType": "O+",
        "contact": "555-0101",
        "medicalHistory": "hypertension",
        "checkups": [{ "vitals": { "bloodPressure": "150/95", "heartRate": 88 }, "symptoms": "headache" }]
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn register_and_login_scenario() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "role": "nurse", "name": "A", "email": "a@x.com", "password": "p" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "a@x.com", "password": "p" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "nurse");

    let token = body["token"].as_str().unwrap();
    let claims = TokenIssuer::new(SECRET, Duration::hours(1)).verify(token).unwrap();
    assert_eq!(claims.sub, body["user"]["id"].as_str().unwrap());
    assert_eq!(claims.role, Role::Nurse);

    let (status, me) = app.get("/api/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");
}

#[tokio::test]
async fn login_failures_and_duplicate_registration() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    app.login_as("doctor", "house@ward.org").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "house@ward.org", "password": "pw", "selectedRole": "nurse" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().starts_with("Role mismatch"));

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "house@ward.org", "password": "pw", "role": "doctor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "house@ward.org", "password": "nope" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "role": "nurse", "name": "B", "email": "HOUSE@ward.org", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let token = app.login_as("receptionist", "desk@ward.org").await;

    let (status, body) = app.call(Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");

    let (status, _) = app.get("/api/patients", "not.a.token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, me) = app.get("/api/auth/me", &token).await;
    let expired = TokenIssuer::new(SECRET, Duration::minutes(-10))
        .issue(me["id"].as_str().unwrap(), Role::Receptionist)
        .unwrap();
    let (status, _) = app.get("/api/patients", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/patients", &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn access_policy_is_enforced_per_resource() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;

    let (_, record) = app.post("/api/patients", &desk, patient("P-100")).await;
    let patient_id = record["id"].as_str().unwrap();

    let (status, body) = app
        .post("/api/checkups", &desk, json!({ "patientId": patient_id, "symptoms": "cough" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("receptionist"));

    let (status, _) = app.post("/api/ai/analyze", &desk, json!({ "symptoms": "cough" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/patients/{}", patient_id), &doctor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/api/checkups", &doctor, json!({ "patientId": patient_id, "symptoms": "cough" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn patient_lifecycle() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;

    let (status, created) = app.post("/api/patients", &desk, patient(" p-200 ")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nationalId"], "P-200");
    assert_eq!(created["checkups"].as_array().unwrap().len(), 1);
    assert_eq!(created["checkups"][0]["kind"], "initial");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.get(&format!("/api/patients/{}", id), &desk).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Maria Lopez");
    assert_eq!(fetched["checkups"][0]["vitals"]["heartRate"], 88.0);

    let (status, body) = app.post("/api/patients", &desk, patient("P-200")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("nationalId"));

    let (status, updated) = app
        .put(&format!("/api/patients/{}", id), &desk, json!({ "contact": null, "address": "12 Elm St", "id": "hijack" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["address"], "12 Elm St");
    assert!(updated.get("contact").is_none());
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, found) = app.get("/api/patients?search=lopez", &desk).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, body) = app.delete(&format!("/api/patients/{}", id), &desk).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkupsRemoved"], 1);

    let (status, _) = app.get(&format!("/api/patients/{}", id), &desk).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, checkups) = app.get(&format!("/api/checkups?patientId={}", id), &desk).await;
    assert!(checkups.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;

    let (status, body) = app.post("/api/patients", &desk, json!({ "name": "No Id" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = app
        .post("/api/rooms", &desk, json!({ "name": "Ward 1", "roomNumber": 1, "status": "Broken" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkup_requires_existing_patient() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let nurse = app.login_as("nurse", "nurse@ward.org").await;

    let (status, body) = app
        .post("/api/checkups", &nurse, json!({ "patientId": "does-not-exist", "symptoms": "fever" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Patient not found" }));

    let (_, all) = app.get("/api/checkups", &nurse).await;
    assert!(all.as_array().unwrap().is_empty());

    let (_, record) = app.post("/api/patients", &nurse, patient("P-300")).await;
    let patient_id = record["id"].as_str().unwrap();
    let (_, checkup) = app
        .post("/api/checkups", &nurse, json!({ "patientId": patient_id, "symptoms": "fever" }))
        .await;
    let (status, _) = app
        .put(
            &format!("/api/checkups/{}", checkup["id"].as_str().unwrap()),
            &nurse,
            json!({ "patientId": "missing" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, appended) = app
        .post(&format!("/api/patients/{}/checkups", patient_id), &nurse, json!({ "vitals": { "temperature": 37.2 } }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appended["kind"], "initial");
    let (_, listed) = app.get(&format!("/api/patients/{}/checkups", patient_id), &nurse).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn room_occupancy_updates_the_summary() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;

    let (_, second) = app.post("/api/rooms", &desk, json!({ "name": "Ward B", "roomNumber": 2 })).await;
    let (status, _) = app.post("/api/rooms", &desk, json!({ "name": "Ward A", "roomNumber": 1 })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post("/api/rooms", &desk, json!({ "name": "Dup", "roomNumber": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let room_id = second["id"].as_str().unwrap();
    let (status, updated) = app.put(&format!("/api/rooms/{}", room_id), &desk, json!({ "status": "Occupied" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Occupied");

    let (_, rooms) = app.get("/api/rooms", &desk).await;
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms[0]["roomNumber"], 1);
    assert_eq!(rooms[1]["status"], "Occupied");

    let (_, summary) = app.get("/api/rooms/summary", &desk).await;
    assert_eq!(summary, json!({ "total": 2, "available": 1, "occupied": 1 }));
}

#[tokio::test]
async fn appointments_snapshot_checkups_and_check_doctors() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let nurse = app.login_as("nurse", "nurse@ward.org").await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (_, doctor_profile) = app.get("/api/auth/me", &doctor).await;
    let (_, nurse_profile) = app.get("/api/auth/me", &nurse).await;

    let (_, record) = app.post("/api/patients", &nurse, patient("P-400")).await;
    let patient_id = record["id"].as_str().unwrap();
    let checkup_id = record["checkups"][0]["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/appointments",
            &nurse,
            json!({ "patientId": patient_id, "doctorId": nurse_profile["id"], "dateTime": "2030-01-02T09:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, appointment) = app
        .post(
            "/api/appointments",
            &nurse,
            json!({
                "patientId": patient_id,
                "doctorId": doctor_profile["id"],
                "dateTime": "2030-01-02T09:00:00Z",
                "checkupIds": [checkup_id]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["status"], "scheduled");
    assert_eq!(appointment["checkups"][0]["checkupId"], checkup_id);

    // Later edits to the checkup do not reach the snapshot.
    app.put(&format!("/api/checkups/{}", checkup_id), &nurse, json!({ "symptoms": "resolved" })).await;
    let (_, fetched) = app
        .get(&format!("/api/appointments/{}", appointment["id"].as_str().unwrap()), &nurse)
        .await;
    assert_eq!(fetched["checkups"][0]["symptoms"], "headache");

    let (status, _) = app
        .post("/api/appointments", &nurse, json!({ "patientId": patient_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_never_expose_password_hashes() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;
    app.login_as("doctor", "doc@ward.org").await;

    let (status, users) = app.get("/api/users?role=doctor", &desk).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("passwordHash").is_none());

    let doctor_id = users[0]["id"].as_str().unwrap();
    let (status, updated) = app
        .put(&format!("/api/users/{}", doctor_id), &desk, json!({ "name": "Dr. Grey", "password": "new-pw" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Dr. Grey");

    let (status, _) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "doc@ward.org", "password": "new-pw" })))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn analysis_requires_clinical_data() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;

    let (status, body) = app
        .post(
            "/api/ai/analyze",
            &doctor,
            json!({ "symptoms": "Not provided", "examination": "", "vitals": { "heartRate": "n/a" }, "notes": "NONE" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Insufficient data"));
}

#[tokio::test]
async fn analysis_is_normalized_and_stored_on_the_checkup() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (_, record) = app.post("/api/patients", &app.login_as("nurse", "n@ward.org").await, patient("P-500")).await;
    let checkup_id = record["checkups"][0]["id"].as_str().unwrap();

    let (status, analysis) = app
        .post(
            "/api/ai/analyze",
            &doctor,
            json!({ "symptoms": "fever, productive cough", "checkupId": checkup_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["diagnoses"][0]["condition"], "Community-acquired pneumonia");
    assert_eq!(analysis["confidence"], 78.0);
    assert_eq!(analysis["metadata"]["model"], "stub-model");
    assert_eq!(analysis["error"], false);

    let (_, checkup) = app.get(&format!("/api/checkups/{}", checkup_id), &doctor).await;
    assert_eq!(checkup["aiAnalysis"]["recommendedAction"], "Chest X-ray");

    let (status, _) = app
        .post("/api/ai/analyze", &doctor, json!({ "symptoms": "fever", "checkupId": "missing" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analysis_failures_follow_the_error_table() {
    let body = json!({ "symptoms": "chest pain" });

    let app = TestApp::spawn(Reply::RateLimited).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (status, _) = app.post("/api/ai/analyze", &doctor, body.clone()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let app = TestApp::spawn(Reply::MissingKey).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (status, response) = app.post("/api/ai/analyze", &doctor, body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["message"].as_str().unwrap().starts_with("Configuration error"));

    let app = TestApp::spawn(Reply::Text("Sorry, I cannot provide medical advice.")).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (status, fallback) = app.post("/api/ai/analyze", &doctor, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback["error"], true);
    assert_eq!(fallback["recommendedAction"], "Manual review required");
    assert_eq!(fallback["confidence"], 0.0);
}

#[tokio::test]
async fn analysis_keeps_edits_made_while_the_model_runs() {
    let app = TestApp::spawn(Reply::Slow(GOOD_REPLY)).await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let nurse = app.login_as("nurse", "nurse@ward.org").await;
    let (_, record) = app.post("/api/patients", &nurse, patient("P-510")).await;
    let (_, second) = app.post("/api/patients", &nurse, patient("P-511")).await;
    let checkup_path = format!("/api/checkups/{}", record["checkups"][0]["id"].as_str().unwrap());
    let removed_id = second["checkups"][0]["id"].as_str().unwrap();

    let analyze = app.post(
        "/api/ai/analyze",
        &doctor,
        json!({ "symptoms": "fever", "checkupId": record["checkups"][0]["id"] }),
    );
    let edit = async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        app.put(&checkup_path, &doctor, json!({ "doctorNotes": "edited during analysis" })).await
    };
    let ((status, _), (edit_status, _)) = tokio::join!(analyze, edit);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edit_status, StatusCode::OK);

    let (_, checkup) = app.get(&checkup_path, &doctor).await;
    assert_eq!(checkup["doctorNotes"], "edited during analysis");
    assert_eq!(checkup["aiAnalysis"]["recommendedAction"], "Chest X-ray");

    // A checkup deleted mid-call stays deleted.
    let analyze = app.post("/api/ai/analyze", &doctor, json!({ "symptoms": "fever", "checkupId": removed_id }));
    let remove = async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        app.delete(&format!("/api/checkups/{}", removed_id), &doctor).await
    };
    let ((status, _), (remove_status, _)) = tokio::join!(analyze, remove);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(remove_status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/checkups/{}", removed_id), &doctor).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_and_deletes_of_missing_documents_are_not_found() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;

    for resource in ["rooms", "appointments", "announcements", "patients"] {
        let path = format!("/api/{}/no-such-id", resource);
        let (status, body) = app.put(&path, &desk, json!({ "notes": "x" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {}", path);
        assert!(body["message"].as_str().unwrap().ends_with("not found"));

        let (status, _) = app.delete(&path, &desk).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {}", path);
    }
}

#[tokio::test]
async fn announcement_lifecycle() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;
    let nurse = app.login_as("nurse", "nurse@ward.org").await;

    let (status, older) = app
        .post(
            "/api/announcements",
            &desk,
            json!({ "title": "Fire drill", "content": "Friday 10:00", "date": "2030-03-01T10:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(older["author"], "Test receptionist");
    assert_eq!(older["urgency"], "normal");

    let (_, newer) = app
        .post(
            "/api/announcements",
            &desk,
            json!({ "title": "Lift out of order", "content": "Use stairs", "date": "2030-03-05T08:00:00Z", "urgency": "urgent" }),
        )
        .await;

    let (status, _) = app.post("/api/announcements", &nurse, json!({ "title": "t", "content": "c" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = app.get("/api/announcements", &nurse).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = listed.as_array().unwrap().iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Lift out of order", "Fire drill"]);

    let older_path = format!("/api/announcements/{}", older["id"].as_str().unwrap());
    let (status, updated) = app.put(&older_path, &desk, json!({ "content": "Moved to Monday" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Moved to Monday");
    assert_eq!(updated["title"], "Fire drill");

    let (status, body) = app.delete(&older_path, &desk).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], older["id"]);
    let (_, listed) = app.get("/api/announcements", &desk).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], newer["id"]);
}

#[tokio::test]
async fn appointments_are_listed_by_time_and_filtered() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;
    let doctor = app.login_as("doctor", "doc@ward.org").await;
    let (_, doctor_profile) = app.get("/api/auth/me", &doctor).await;
    let doctor_id = doctor_profile["id"].as_str().unwrap();

    let (_, first) = app.post("/api/patients", &desk, patient("P-600")).await;
    let (_, second) = app.post("/api/patients", &desk, patient("P-601")).await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    for (patient_id, doctor, at) in [
        (first_id, Some(format!(" {} ", doctor_id)), "2030-05-03T09:00:00Z"),
        (second_id, None, "2030-05-01T09:00:00Z"),
        (first_id, None, "2030-05-02T09:00:00Z"),
    ] {
        let (status, _) = app
            .post("/api/appointments", &desk, json!({ "patientId": patient_id, "doctorId": doctor, "dateTime": at }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = app.get("/api/appointments", &desk).await;
    let times: Vec<&str> = all.as_array().unwrap().iter().map(|a| a["dateTime"].as_str().unwrap()).collect();
    assert_eq!(times.len(), 3);
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", times);

    let (_, for_first) = app.get(&format!("/api/appointments?patientId={}", first_id), &desk).await;
    assert_eq!(for_first.as_array().unwrap().len(), 2);

    let (_, for_doctor) = app.get(&format!("/api/appointments?doctorId={}", doctor_id), &desk).await;
    let for_doctor = for_doctor.as_array().unwrap();
    assert_eq!(for_doctor.len(), 1);
    assert_eq!(for_doctor[0]["patientId"], first_id);
    assert_eq!(for_doctor[0]["doctorId"], doctor_id);
}

#[tokio::test]
async fn bad_query_strings_are_json_errors() {
    let app = TestApp::spawn(Reply::Text(GOOD_REPLY)).await;
    let desk = app.login_as("receptionist", "desk@ward.org").await;

    let (status, body) = app.get("/api/users?role=admin", &desk).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
