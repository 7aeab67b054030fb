//! Request engine behaviour against a mock API: bearer handling, the
//! coordinated refresh, the single retry and error hygiene.

mod common;

use std::time::Duration;

use campus_client::auth::CredentialStore;
use campus_client::{ApiError, Empty, RequestOptions};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{harness, sign_in, stored};

fn refresh_ok(access: &str, refresh: Option<&str>) -> ResponseTemplate {
    let body = match refresh {
        Some(r) => json!({ "access_token": access, "refresh_token": r }),
        None => json!({ "access_token": access }),
    };
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_401s_share_one_refresh() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(method("GET"))
        .and(path("/student/courses"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/courses"))
        .and(header("authorization", "Bearer new1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(8)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r1" })))
        .respond_with(refresh_ok("new1", Some("r2")).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = h.client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<Vec<serde_json::Value>>("/student/courses").await
        }));
    }
    for handle in handles {
        let courses = handle.await.unwrap().unwrap();
        assert!(courses.is_empty());
    }

    assert_eq!(stored(&h.store, "access_token").as_deref(), Some("new1"));
    assert_eq!(stored(&h.store, "refresh_token").as_deref(), Some("r2"));
    assert!(!h.client.coordinator().is_held());
    assert_eq!(h.client.coordinator().waiting(), 0);
}

#[tokio::test]
async fn test_missing_token_fails_without_network() {
    let h = harness().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/dashboard")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(err.requires_login());
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_when_not_rotated() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(path("/student/courses"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(path("/student/courses"))
        .and(header("authorization", "Bearer new1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", None))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client
        .get::<Vec<serde_json::Value>>("/student/courses")
        .await
        .unwrap();

    assert_eq!(stored(&h.store, "access_token").as_deref(), Some("new1"));
    assert_eq!(stored(&h.store, "refresh_token").as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_refresh_with_empty_access_token_clears_session() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");
    h.store.set("user_id", "u-1").unwrap();

    Mock::given(path("/student/courses"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("", Some("r2")))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/courses")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RefreshFailed { .. }));
    assert!(err.requires_login());
    assert_eq!(stored(&h.store, "access_token"), None);
    assert_eq!(stored(&h.store, "refresh_token"), None);
    assert_eq!(stored(&h.store, "user_id"), None);
}

#[tokio::test]
async fn test_refresh_call_rejected_surfaces_refresh_failed() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(path("/student/courses"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(400).set_body_string("refresh token r1 revoked"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/courses")
        .await
        .unwrap_err();

    match &err {
        ApiError::RefreshFailed { reason } => {
            assert!(reason.contains("400"));
            assert!(!reason.contains("r1"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(stored(&h.store, "access_token"), None);
}

#[tokio::test]
async fn test_second_401_is_final() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(path("/student/assignments"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", Some("r2")))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/assignments")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    // The refreshed session is kept; only the retry was refused
    assert_eq!(stored(&h.store, "access_token").as_deref(), Some("new1"));
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_refresh_call() {
    let h = harness().await;
    h.store.set("access_token", "old").unwrap();

    Mock::given(path("/student/courses"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", None))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/courses")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_refresh_call_carries_no_bearer() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(path("/student/courses"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(path("/student/courses"))
        .and(header("authorization", "Bearer new1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("content-type", "application/json"))
        .respond_with(refresh_ok("new1", None))
        .mount(&h.server)
        .await;

    h.client
        .get::<Vec<serde_json::Value>>("/student/courses")
        .await
        .unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/auth/refresh")
        .unwrap();
    assert!(!refresh.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_empty_sentinel_accepts_non_json_body() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/chat/conversations/c1/read"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/student/reflections/r9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let read: Empty = h
        .client
        .request::<Empty, ()>(
            Method::POST,
            "/chat/conversations/c1/read",
            None,
            RequestOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(read, Empty);

    let deleted: Empty = h.client.delete("/student/reflections/r9").await.unwrap();
    assert_eq!(deleted, Empty);
}

#[tokio::test]
async fn test_empty_body_for_typed_response_is_decoding_error() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/auth/me")
        .await
        .unwrap_err();
    match err {
        ApiError::Decoding { detail } => assert!(detail.contains("Empty response body")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_token_never_leaks_into_errors() {
    let h = harness().await;
    sign_in(&h.store, "tok-very-secret", "r1");

    Mock::given(path("/student/dashboard"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("x-request-id", "req-42")
                .set_body_string("internal error for Authorization: Bearer tok-very-secret"),
        )
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/dashboard")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.request_id(), Some("req-42"));
    assert!(!err.to_string().contains("tok-very-secret"));
    assert!(!format!("{:?}", err).contains("tok-very-secret"));
}

#[tokio::test]
async fn test_headers_follow_body_presence() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/student/reflections"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({ "body": "hi" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/reflections"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let created: serde_json::Value = h
        .client
        .post("/student/reflections", &json!({ "body": "hi" }))
        .await
        .unwrap();
    assert_eq!(created["ok"], true);

    let _: Vec<serde_json::Value> = h.client.get("/student/reflections").await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let get = requests.iter().find(|r| r.method.as_str() == "GET").unwrap();
    assert!(!get.headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_explicit_token_overrides_stored_one() {
    let h = harness().await;
    sign_in(&h.store, "stored", "r1");

    Mock::given(path("/auth/me"))
        .and(header("authorization", "Bearer explicit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let me: serde_json::Value = h
        .client
        .request::<_, ()>(
            Method::GET,
            "/auth/me",
            None,
            RequestOptions::default().with_access_token("explicit"),
        )
        .await
        .unwrap();
    assert_eq!(me["id"], "u1");
}

#[tokio::test]
async fn test_rejected_explicit_token_retries_with_stored_token() {
    let h = harness().await;
    sign_in(&h.store, "stored", "r1");

    Mock::given(path("/auth/me"))
        .and(header("authorization", "Bearer explicit"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(path("/auth/me"))
        .and(header("authorization", "Bearer stored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", Some("r2")))
        .expect(0)
        .mount(&h.server)
        .await;

    let me: serde_json::Value = h
        .client
        .request::<_, ()>(
            Method::GET,
            "/auth/me",
            None,
            RequestOptions::default().with_access_token("explicit"),
        )
        .await
        .unwrap();
    assert_eq!(me["id"], "u1");
    assert_eq!(stored(&h.store, "access_token").as_deref(), Some("stored"));
    assert_eq!(stored(&h.store, "refresh_token").as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_anonymous_401_is_plain_http_error() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", None))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .request::<serde_json::Value, _>(
            Method::POST,
            "/auth/login",
            Some(&json!({ "email": "a@b.c", "password": "x" })),
            RequestOptions::anonymous(),
        )
        .await
        .unwrap_err();

    match err {
        ApiError::Http { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_refresh_releases_lock_for_next_waiter() {
    let h = harness().await;
    sign_in(&h.store, "old", "r1");

    Mock::given(path("/student/courses"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let first = {
        let client = h.client.clone();
        tokio::spawn(async move { client.get::<serde_json::Value>("/student/courses").await })
    };
    let second = {
        let client = h.client.clone();
        tokio::spawn(async move { client.get::<serde_json::Value>("/student/courses").await })
    };

    let outcomes = tokio::time::timeout(Duration::from_secs(5), async {
        (first.await.unwrap(), second.await.unwrap())
    })
    .await
    .expect("second waiter must not deadlock");

    let errors = [outcomes.0.unwrap_err(), outcomes.1.unwrap_err()];
    let refresh_failed = errors
        .iter()
        .filter(|e| matches!(e, ApiError::RefreshFailed { .. }))
        .count();
    let unauthenticated = errors
        .iter()
        .filter(|e| matches!(e, ApiError::Unauthenticated))
        .count();
    assert_eq!((refresh_failed, unauthenticated), (1, 1));
    assert!(!h.client.coordinator().is_held());
}

#[tokio::test]
async fn test_refresh_session_on_demand() {
    let h = harness().await;
    sign_in(&h.store, "still-valid", "r1");

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r1" })))
        .respond_with(refresh_ok("fresh", Some("r2")))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.refresh_session().await.unwrap();

    assert_eq!(stored(&h.store, "access_token").as_deref(), Some("fresh"));
    assert_eq!(stored(&h.store, "refresh_token").as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_non_401_errors_are_not_retried() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(path("/student/courses"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(refresh_ok("new1", None))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<serde_json::Value>("/student/courses")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(!err.requires_login());
}

#[tokio::test]
async fn test_per_call_timeout_is_transport_error() {
    let h = harness().await;
    sign_in(&h.store, "tok", "r1");

    Mock::given(path("/student/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .request::<serde_json::Value, ()>(
            Method::GET,
            "/student/dashboard",
            None,
            RequestOptions::default().with_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
