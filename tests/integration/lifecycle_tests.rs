//! Router tests over the in-memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use asset_tracker_server::{
    api,
    config::AppConfig,
    models::{enums::Role, user::UserClaims},
    repository::MemoryRepository,
    AppState,
};

struct TestApp {
    router: Router,
    admin: String,
    operator: String,
    viewer: String,
}

impl TestApp {
    async fn new() -> Self {
        let config = AppConfig::default();
        let secret = config.auth.jwt_secret.clone();
        let state = AppState::new(config, Arc::new(MemoryRepository::new()));

        let mut tokens = Vec::new();
        for (username, role) in [("admin", Role::Admin), ("operator", Role::Operator), ("viewer", Role::Viewer)] {
            let user = state
                .services
                .auth
                .provision_user(username, "password", &format!("{username} user"), role)
                .await
                .unwrap();
            let token = UserClaims::for_user(&user, Utc::now().timestamp(), 1)
                .create_token(&secret)
                .unwrap();
            tokens.push(token);
        }
        let viewer = tokens.pop().unwrap();
        let operator = tokens.pop().unwrap();
        let admin = tokens.pop().unwrap();

        Self {
            router: api::create_router(state),
            admin,
            operator,
            viewer,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_asset(&self, code: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/assets",
                Some(&self.operator),
                Some(json!({
                    "code": code,
                    "name": "Laptop ThinkPad T14",
                    "category": "Laptop",
                    "location": "Room A"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn start_loan(&self, asset_id: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/loans",
            Some(&self.operator),
            Some(json!({
                "assetId": asset_id,
                "borrowerName": "Budi Santoso",
                "borrowerDept": "Finance",
                "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
            })),
        )
        .await
    }

    async fn audit_actions(&self) -> Vec<(String, String)> {
        let (status, body) = self
            .send(Method::GET, "/api/audit-logs?perPage=100", Some(&self.viewer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e["action"].as_str().unwrap().to_string(),
                    e["entityType"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }
}

#[tokio::test]
async fn missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/assets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let (status, body) = app.send(Method::GET, "/api/assets", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn login_returns_token_and_is_audited() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "operator", "password": "password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "OPERATOR");

    let token = body["token"].as_str().unwrap().to_string();
    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "operator");

    assert_eq!(app.audit_actions().await, vec![("LOGIN".to_string(), "User".to_string())]);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "operator", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn operator_relocates_but_cannot_delete() {
    let app = TestApp::new().await;
    let asset = app.create_asset("TIK-2024-001").await;
    let asset_id = asset["id"].as_str().unwrap();

    let (status, mutation) = app
        .send(
            Method::POST,
            "/api/mutations",
            Some(&app.operator),
            Some(json!({ "assetId": asset_id, "toLocation": "Room B", "description": "Moved for audit" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mutation["fromLocation"], "Room A");
    assert_eq!(mutation["toLocation"], "Room B");

    let (status, details) = app
        .send(Method::GET, &format!("/api/assets/{asset_id}"), Some(&app.viewer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["location"], "Room B");
    assert_eq!(details["status"], "AVAILABLE");
    assert_eq!(details["mutations"].as_array().unwrap().len(), 1);
    assert_eq!(details["mutations"][0]["userName"], "operator user");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/assets/{asset_id}"), Some(&app.operator), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/assets/{asset_id}"), Some(&app.admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let actions = app.audit_actions().await;
    assert_eq!(
        actions,
        vec![
            ("DELETE".to_string(), "Asset".to_string()),
            ("MUTATION".to_string(), "Asset".to_string()),
            ("CREATE".to_string(), "Asset".to_string()),
        ]
    );
}

#[tokio::test]
async fn viewer_is_read_only() {
    let app = TestApp::new().await;
    let asset = app.create_asset("TIK-2024-002").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/mutations",
            Some(&app.viewer),
            Some(json!({ "assetId": asset["id"], "toLocation": "Room C" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = app.send(Method::GET, "/api/assets", Some(&app.viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["location"], "Room A");
    assert!(list[0]["latestMutation"].is_null());
}

#[tokio::test]
async fn gate_runs_before_body_checks() {
    let app = TestApp::new().await;

    for (method, uri, body) in [
        (Method::POST, "/api/assets", json!({ "code": "" })),
        (Method::POST, "/api/loans", json!({ "assetId": "not-a-uuid" })),
        (Method::POST, "/api/maintenances", json!({})),
    ] {
        let (status, response) = app.send(method, uri, Some(&app.viewer), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}: {response}");
        assert_eq!(response["message"], "Forbidden");
    }

    let (status, _) = app
        .send(Method::POST, "/api/assets", Some(&app.operator), Some(json!({ "code": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_path_and_query_use_error_body() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::DELETE, "/api/assets/not-a-uuid", Some(&app.admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");

    let (status, body) = app
        .send(Method::GET, "/api/audit-logs?page=abc", Some(&app.viewer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");

    let (status, body) = app
        .send(Method::GET, "/api/audit-logs?page=9223372036854775807", Some(&app.viewer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn loan_cycle_and_double_loan() {
    let app = TestApp::new().await;
    let asset = app.create_asset("TIK-2024-003").await;
    let asset_id = asset["id"].as_str().unwrap();

    let (status, loan) = app.start_loan(asset_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "ACTIVE");

    let (status, body) = app.start_loan(asset_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Asset is not available");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/assets/{asset_id}"),
            Some(&app.operator),
            Some(json!({ "status": "BROKEN" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let loan_id = loan["id"].as_str().unwrap();
    let (status, returned) = app
        .send(Method::POST, &format!("/api/loans/{loan_id}/return"), Some(&app.operator), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "RETURNED");
    assert!(returned["returnDate"].is_string());

    let (status, body) = app
        .send(Method::POST, &format!("/api/loans/{loan_id}/return"), Some(&app.operator), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Loan is not active");

    let (_, details) = app
        .send(Method::GET, &format!("/api/assets/{asset_id}"), Some(&app.viewer), None)
        .await;
    assert_eq!(details["status"], "AVAILABLE");
    assert_eq!(details["loans"].as_array().unwrap().len(), 1);

    let (status, active) = app
        .send(Method::GET, "/api/loans?status=ACTIVE", Some(&app.viewer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(active.as_array().unwrap().is_empty());

    let actions = app.audit_actions().await;
    assert_eq!(actions[0], ("LOAN_RETURN".to_string(), "Loan".to_string()));
    assert_eq!(actions[1], ("LOAN_START".to_string(), "Loan".to_string()));
    assert_eq!(actions.len(), 3);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/assets",
            Some(&app.operator),
            Some(json!({ "code": "  ", "name": "Switch", "category": "Network", "location": "Rack 1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/assets",
            Some(&app.operator),
            Some(json!({ "code": "SW-01", "name": "Switch", "category": "Network", "location": "Rack 1", "status": "LOANED" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_asset("SW-01").await;
    let (status, _) = app
        .send(
            Method::POST,
            "/api/assets",
            Some(&app.operator),
            Some(json!({ "code": "SW-01", "name": "Switch", "category": "Network", "location": "Rack 2" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/mutations",
            Some(&app.operator),
            Some(json!({ "assetId": uuid::Uuid::new_v4(), "toLocation": "Room B" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_and_chain_verification() {
    let app = TestApp::new().await;
    let asset = app.create_asset("PRN-01").await;
    app.create_asset("PRN-02").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/maintenances",
            Some(&app.operator),
            Some(json!({
                "assetId": asset["id"],
                "type": "ROUTINE",
                "cost": "250000",
                "description": "Toner and roller replacement",
                "performedBy": "PT Servis Printer",
                "nextServiceDate": (Utc::now() + Duration::days(5)).to_rfc3339()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stats) = app.send(Method::GET, "/api/stats", Some(&app.viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalAssets"], 2);
    assert_eq!(stats["assetsByStatus"], json!([{ "status": "AVAILABLE", "count": 2 }]));
    assert_eq!(stats["assetsByCategory"], json!([{ "category": "Laptop", "count": 2 }]));
    assert_eq!(stats["recentLogs"].as_array().unwrap().len(), 3);
    assert_eq!(stats["reminders"].as_array().unwrap().len(), 1);
    assert_eq!(stats["reminders"][0]["code"], "PRN-01");

    let (status, _) = app
        .send(Method::GET, "/api/audit-logs/verify", Some(&app.operator), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, report) = app
        .send(Method::GET, "/api/audit-logs/verify", Some(&app.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true);
    assert_eq!(report["checked"], 3);
}
