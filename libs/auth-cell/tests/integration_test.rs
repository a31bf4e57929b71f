use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::services::password;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(config: &AppConfig) -> Router {
    auth_routes(Arc::new(config.clone()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn signup_issues_a_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::new("asha", "asha@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::user_row(&user, "hash")
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({
                "username": "asha",
                "password": "secret-pass",
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert!(body["token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn signup_rejects_duplicate_username_before_writing() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let existing = TestUser::new("asha", "other@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&existing, "hash")
        ])))
        .mount(&mock_server)
        .await;

    // No insert may happen for a rejected signup
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({
                "username": "asha",
                "password": "secret-pass",
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["username"], "Username already exists");
}

#[tokio::test]
async fn signup_rejects_duplicate_email_before_writing() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let existing = TestUser::new("someone_else", "asha@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&existing, "hash")
        ])))
        .mount(&mock_server)
        .await;

    // No insert may happen for a rejected signup
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({
                "username": "asha",
                "password": "secret-pass",
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["email"], "Email already exists");
}

#[tokio::test]
async fn signup_rejects_missing_fields() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(&config);

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({ "username": "asha", "password": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "All fields are required.");
}

#[tokio::test]
async fn login_succeeds_with_the_right_password() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::new("asha", "asha@example.com");
    let hash = password::hash_password("secret-pass").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&user, &hash)
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_json(
            "/login",
            json!({ "username": "asha", "password": "secret-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn login_does_not_say_whether_the_user_exists() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    let user = TestUser::new("asha", "asha@example.com");
    let hash = password::hash_password("secret-pass").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&user, &hash)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("username", "eq.nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // Wrong password
    let app = create_test_app(&config);
    let response = app
        .oneshot(post_json(
            "/login",
            json!({ "username": "asha", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_password = response_json(response).await;

    // Unknown user
    let app = create_test_app(&config);
    let response = app
        .oneshot(post_json(
            "/login",
            json!({ "username": "nobody", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let unknown_user = response_json(response).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "Invalid credentials");
}

#[tokio::test]
async fn profile_requires_a_token() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(&config);

    let request = Request::builder()
        .method("GET")
        .uri("/profile")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_returns_the_stored_names() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::new("asha", "asha@example.com");
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&user, "hash")
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/profile")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["username"], "asha");
    assert_eq!(body["first_name"], "Test");
}
