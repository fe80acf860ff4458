use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, DeleteBehavior, MockConfig};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn authed_json_request(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(body.to_string())
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

async fn login_token(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/autenticacao/login",
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

// --- auth gate ---

#[tokio::test]
async fn resource_routes_require_a_live_token() {
    let app = app(MockConfig::default());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/pets")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(authed_request("GET", "/v1/pets", "access-made-up"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- login ---

#[tokio::test]
async fn login_rejects_empty_credentials() {
    let app = app(MockConfig::default());
    let resp = app
        .oneshot(json_request(
            "POST",
            "/autenticacao/login",
            r#"{"username":"","password":"secret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_a_token_pair() {
    let app = app(MockConfig::default());
    let resp = app
        .oneshot(json_request(
            "POST",
            "/autenticacao/login",
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in"], 300);
    assert_eq!(body["refresh_expires_in"], 1800);
}

#[tokio::test]
async fn refresh_rotates_the_pair_once() {
    let app = app(MockConfig::default());
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/autenticacao/login",
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();
    let first = body_json(resp).await;
    let refresh = first["refresh_token"].as_str().unwrap();

    let resp = app
        .clone()
        .oneshot(authed_request("PUT", "/autenticacao/refresh", refresh))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let second = body_json(resp).await;
    assert_ne!(second["access_token"], first["access_token"]);

    // The consumed refresh token no longer works.
    let resp = app
        .oneshot(authed_request("PUT", "/autenticacao/refresh", refresh))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- health ---

#[tokio::test]
async fn health_answers_without_auth() {
    let app = app(MockConfig::default());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(!body["timestamp"].as_str().unwrap().is_empty());
}

// --- legacy contract ---

#[tokio::test]
async fn legacy_mode_rejects_especie_and_records_both_attempts() {
    let app = app(MockConfig {
        legacy_writes: true,
        ..Default::default()
    });
    let token = login_token(&app).await;

    let resp = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/pets",
            &token,
            r#"{"nome":"Luna","especie":"Cachorro"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/pets",
            &token,
            r#"{"nome":"Luna"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/_test/writes")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    let writes = body_json(resp).await;
    let writes = writes.as_array().unwrap();
    assert_eq!(writes.len(), 2);
    assert!(writes[0].get("especie").is_some());
    assert!(writes[1].get("especie").is_none());
}

#[tokio::test]
async fn legacy_mode_answers_400_for_unknown_tutor() {
    let app = app(MockConfig {
        legacy_writes: true,
        ..Default::default()
    });
    let token = login_token(&app).await;

    let resp = app
        .oneshot(authed_request("GET", "/v1/tutores/999", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let app = mock_server::app(MockConfig::default());
    let token = login_token(&app).await;
    let resp = app
        .oneshot(authed_request("GET", "/v1/tutores/999", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- listing ---

#[tokio::test]
async fn listing_paginates_filters_and_records_the_query() {
    let app = app(MockConfig::default());
    let token = login_token(&app).await;

    for nome in ["Luna", "Lua", "Thor"] {
        let resp = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/v1/pets",
                &token,
                &format!(r#"{{"nome":"{nome}","especie":"Cachorro"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app
        .clone()
        .oneshot(authed_request("GET", "/v1/pets?page=0&size=2", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["pageCount"], 2);
    assert_eq!(body["content"].as_array().unwrap().len(), 2);

    let resp = app
        .clone()
        .oneshot(authed_request(
            "GET",
            "/v1/pets?page=0&size=10&nome=lu",
            &token,
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["pageCount"], 1);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/_test/last-query")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["query"], "page=0&size=10&nome=lu");
}

// --- delete behaviors ---

#[tokio::test]
async fn failing_deletes_follow_the_configured_behavior() {
    let app = app(MockConfig {
        delete_behavior: DeleteBehavior::FailAfterRemove,
        ..Default::default()
    });
    let token = login_token(&app).await;
    let resp = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/pets",
            &token,
            r#"{"nome":"Luna","especie":"Cachorro"}"#,
        ))
        .await
        .unwrap();
    let created = body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(authed_request("DELETE", &format!("/v1/pets/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Gone despite the error answer.
    let resp = app
        .oneshot(authed_request("GET", &format!("/v1/pets/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let app = mock_server::app(MockConfig {
        delete_behavior: DeleteBehavior::FailAndKeep,
        ..Default::default()
    });
    let token = login_token(&app).await;
    let resp = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/v1/pets",
            &token,
            r#"{"nome":"Thor","especie":"Gato"}"#,
        ))
        .await
        .unwrap();
    let created = body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(authed_request("DELETE", &format!("/v1/pets/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app
        .oneshot(authed_request("GET", &format!("/v1/pets/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
