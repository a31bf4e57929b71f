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

use checkout_cell::router::checkout_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(config: &AppConfig) -> Router {
    checkout_routes(Arc::new(config.clone()))
}

fn checkout_request(token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/checkout")
        .header("authorization", format!("Bearer {}", token))
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
async fn medicine_checkout_creates_a_session_and_clears_the_cart() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::stripe_session("cs_test_abc"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // One ledger row per purchased item
    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 1,
            "user_id": user.id,
            "product_name": "Paracetamol",
            "amount": 50.0,
            "purchase_type": "Medicine",
            "purchase_date": "2025-06-12T10:00:00Z"
        }])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail_1" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/carts"))
        .and(query_param("user_id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "Medicine",
                "items": [
                    { "product": { "name": "Paracetamol", "price": 25.0 }, "quantity": 2 },
                    { "product": { "name": "Vitamin C", "price": 110.5 }, "quantity": 1 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["sessionId"], "cs_test_abc");
}

#[tokio::test]
async fn an_empty_checkout_never_reaches_stripe() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::stripe_session("cs_test_abc"),
        ))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({ "purchase_type": "Medicine", "items": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn appointment_checkout_uses_the_stored_fees() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(7, "Mehta", "Mumbai", 500.0)
        ])))
        .mount(&mock_server)
        .await;

    // The stored fees, not the payload, set the charged amount
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(wiremock::matchers::body_string_contains("50000"))
        .and(wiremock::matchers::body_string_contains(
            "Appointment+with+Dr.+Mehta",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::stripe_session("cs_test_appt"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 2,
            "user_id": user.id,
            "product_name": "Appointment with Dr. Mehta",
            "amount": 500.0,
            "purchase_type": "appointment",
            "purchase_date": "2025-06-12T10:00:00Z"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail_2" })))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "appointment",
                "items": [{ "doctor_id": 7, "date": "2025-06-12", "price": 1.0 }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["sessionId"], "cs_test_appt");
}

#[tokio::test]
async fn a_store_outage_during_appointment_checkout_is_a_server_error() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::stripe_session("cs_test_down"),
        ))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "appointment",
                "items": [{ "doctor_id": 7, "date": "2025-06-12", "price": 1.0 }]
            }),
        ))
        .await
        .unwrap();

    // An unreachable store is not a missing doctor
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_ne!(body["error"], "Doctor not found");
}

#[tokio::test]
async fn receipts_greet_by_the_stored_full_name() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(&user, "irrelevant")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::stripe_session("cs_test_name"),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 3,
            "user_id": user.id,
            "product_name": "Paracetamol",
            "amount": 25.0,
            "purchase_type": "Medicine",
            "purchase_date": "2025-06-12T10:00:00Z"
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/carts"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    // The stored names, not the token username, open the receipt
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(wiremock::matchers::body_string_contains("Test User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail_3" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "Medicine",
                "items": [{ "product": { "name": "Paracetamol", "price": 25.0 }, "quantity": 1 }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn a_stripe_outage_leaves_no_ledger_rows() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "internal" }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/purchases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/carts"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "Medicine",
                "items": [{ "product": { "name": "Paracetamol", "price": 25.0 }, "quantity": 1 }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn an_unknown_purchase_type_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    let response = app
        .oneshot(checkout_request(
            &token,
            json!({
                "purchase_type": "subscription",
                "items": [{ "price": 10.0 }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purchases_come_back_newest_first() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let app = create_test_app(&config);

    let user = TestUser::default();
    let token = user.token(&config.app_jwt_secret);

    Mock::given(method("GET"))
        .and(path("/rest/v1/purchases"))
        .and(query_param("user_id", format!("eq.{}", user.id)))
        .and(query_param("order", "purchase_date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 2,
                "user_id": user.id,
                "product_name": "Vitamin C",
                "amount": 110.5,
                "purchase_type": "Medicine",
                "purchase_date": "2025-06-13T10:00:00Z"
            },
            {
                "id": 1,
                "user_id": user.id,
                "product_name": "Paracetamol",
                "amount": 50.0,
                "purchase_type": "Medicine",
                "purchase_date": "2025-06-12T10:00:00Z"
            }
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/purchases")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body[0]["product_name"], "Vitamin C");
    assert_eq!(body[1]["product_name"], "Paracetamol");
}
