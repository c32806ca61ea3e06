/// HTTP tests: drive the full router in-process with `oneshot`.
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use gigfind_api::{AppStateInner, router};
use gigfind_core::{Marketplace, StatusPolicy};
use gigfind_db::Database;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let market = Marketplace::new(Database::open_in_memory().unwrap(), StatusPolicy::default());
    router(Arc::new(AppStateInner {
        market,
        jwt_secret: SECRET.into(),
        token_ttl: Duration::days(7),
    }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register and return `(token, user id)`.
async fn register(app: &Router, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "secret123",
            "name": name,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let data = &body["data"];
    (
        data["token"].as_str().unwrap().to_string(),
        data["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn post_gig(app: &Router, token: &str, title: &str, category: &str, pay_rate: f64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/gigs",
        Some(token),
        Some(json!({
            "title": title,
            "description": format!("{} wanted", title),
            "category": category,
            "payRate": pay_rate,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let (token, id) = register(&app, "Ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "ADA@example.com", "password": "secret123", "name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], id.as_str());

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");
    assert!(body["data"]["createdAt"].is_string());

    let (status, body) = send(&app, Method::GET, &format!("/api/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    // signed correctly, but for a user this database has never seen
    let stranger = gigfind_api::auth::create_token(
        SECRET,
        Duration::days(1),
        uuid::Uuid::new_v4(),
        "ghost@example.com",
    )
    .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/gigs/mine", Some(&stranger), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validation_errors_are_field_prefixed() {
    let app = app();
    let (token, _) = register(&app, "Owner").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gigs",
        Some(&token),
        Some(json!({ "title": "", "description": "d", "category": "Design", "payRate": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("title:"), "{}", error);
    assert!(error.contains("payRate:"), "{}", error);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "<script>@evil.com", "password": "secret123", "name": "Mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email: must be a valid email address");

    // incomplete bodies are rejected inside the envelope too
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gigs",
        Some(&token),
        Some(json!({ "title": "Logo" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn gig_listing_and_ownership() {
    let app = app();
    let (owner, owner_id) = register(&app, "Owner").await;
    let (other, _) = register(&app, "Other").await;

    let poster = post_gig(&app, &owner, "Poster", "Design", 50.0).await;
    post_gig(&app, &owner, "Icon", "Design", 120.0).await;
    post_gig(&app, &owner, "Banner", "Design", 150.0).await;
    post_gig(&app, &owner, "Brochure", "Design", 200.0).await;
    post_gig(&app, &owner, "API", "Development", 100.0).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/gigs?category=Design&minPay=50&maxPay=150&page=1&limit=10",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["totalPages"], 1);
    assert_eq!(data["gigs"][0]["title"], "Banner");
    assert_eq!(data["gigs"][0]["createdBy"]["id"], owner_id.as_str());
    assert_eq!(data["gigs"][0]["currency"], "USD");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/gigs/{}", poster),
        Some(&other),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/gigs/{}", poster), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/gigs/{}", poster),
        Some(&owner),
        Some(json!({ "payRate": 75.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payRate"], 75.5);
    assert_eq!(body["data"]["title"], "Poster");

    let (_, body) = send(&app, Method::GET, "/api/gigs/mine", Some(&owner), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/gigs/{}", poster), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/gigs/{}", poster), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/gigs/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn application_lifecycle() {
    let app = app();
    let (owner, _) = register(&app, "A").await;
    let (applicant, applicant_id) = register(&app, "B").await;
    let gig = post_gig(&app, &owner, "Logo design", "Design", 100.0).await;
    let apply_uri = format!("/api/gigs/{}/applications", gig);

    let (status, _) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&owner),
        Some(json!({ "message": "me!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&applicant),
        Some(json!({ "message": "I can help" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["applicant"]["id"], applicant_id.as_str());
    let application = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&applicant),
        Some(json!({ "message": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already applied to this gig");

    let (status, _) = send(&app, Method::GET, &apply_uri, Some(&applicant), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, Method::GET, &apply_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["gig"]["title"], "Logo design");

    let status_uri = format!("/api/applications/{}", application);
    let (status, _) = send(
        &app,
        Method::PATCH,
        &status_uri,
        Some(&applicant),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for decision in ["accepted", "rejected"] {
        let (status, body) = send(
            &app,
            Method::PATCH,
            &status_uri,
            Some(&owner),
            Some(json!({ "status": decision })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], decision);
    }

    let (status, _) = send(
        &app,
        Method::PATCH,
        &status_uri,
        Some(&owner),
        Some(json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/applications/me", Some(&applicant), None).await;
    assert_eq!(body["data"][0]["gig"]["title"], "Logo design");
    assert_eq!(body["data"][0]["status"], "rejected");

    // closing the gig stops new applications
    let (token_c, _) = register(&app, "C").await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/gigs/{}/status", gig),
        Some(&owner),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "closed");

    let (status, body) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&token_c),
        Some(json!({ "message": "too late?" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Gig is not accepting applications");
}

#[tokio::test]
async fn messaging_rules_and_conversations() {
    let app = app();
    let (a, a_id) = register(&app, "A").await;
    let (b, b_id) = register(&app, "B").await;
    let (c, _) = register(&app, "C").await;
    let gig = post_gig(&app, &a, "Logo design", "Design", 100.0).await;

    // no application yet
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/messages",
        Some(&b),
        Some(json!({ "gigId": gig, "receiverId": a_id, "body": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    send(
        &app,
        Method::POST,
        &format!("/api/gigs/{}/applications", gig),
        Some(&b),
        Some(json!({ "message": "I can help" })),
    )
    .await;

    // the conversation id is never client-supplied
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/messages",
        Some(&b),
        Some(json!({ "gigId": gig, "receiverId": a_id, "body": "Hello", "conversationId": "x_y" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/messages",
        Some(&b),
        Some(json!({ "gigId": gig, "receiverId": a_id, "body": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let conversation = body["data"]["conversationId"].as_str().unwrap().to_string();
    let mut pair = [a_id.clone(), b_id.clone()];
    pair.sort();
    assert_eq!(conversation, pair.join("_"));
    assert_eq!(body["data"]["sender"]["name"], "B");
    assert_eq!(body["data"]["gig"]["title"], "Logo design");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/messages",
        Some(&a),
        Some(json!({ "gigId": gig, "receiverId": b_id, "body": "Welcome" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let thread_uri = format!("/api/messages/{}", conversation);
    for token in [&a, &b] {
        let (status, body) = send(&app, Method::GET, &thread_uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        let bodies: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["body"].as_str().unwrap())
            .collect();
        assert_eq!(bodies, vec!["Hello", "Welcome"]);
    }

    let (status, body) = send(&app, Method::GET, &thread_uri, Some(&c), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, Method::GET, "/api/messages", Some(&a), None).await;
    let inbox = body["data"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["conversationId"], conversation.as_str());
    assert_eq!(inbox[0]["messages"][0]["body"], "Welcome");
    assert_eq!(inbox[0]["gig"]["id"], gig.as_str());
}
