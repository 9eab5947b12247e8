use axum::{
    Router,
    http::{Request, StatusCode, header},
    routing::post,
};
use http_body_util::BodyExt;
use mongodb::Client;
use tower::ServiceExt;

use marketpulse::controllers::auth_controller;
use marketpulse::services::polygon::PolygonClient;
use marketpulse::services::threshold_service::MongoThresholdStore;
use marketpulse::services::twelvedata::TwelveDataClient;
use marketpulse::{AppState, config};

async fn test_state() -> AppState {
    let mut settings = config::load();
    settings.twelvedata_api_key = String::new();
    settings.polygon_api_key = String::new();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    AppState {
        db: db.clone(),
        settings,
        twelvedata: TwelveDataClient::new(String::new()),
        polygon: PolygonClient::new(String::new()),
        thresholds: MongoThresholdStore::new(db),
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn post_login_missing_fields_returns_errors() {
    let state = test_state().await;
    let app = Router::new()
        .route("/auth/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(r#"{"email":"","password":""}"#))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Email is required."));
    assert!(body.contains("Password is required."));
}

#[tokio::test]
async fn post_login_invalid_email_returns_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/auth/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"email":"not-an-email","password":"123456"}"#,
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email."));
}

#[tokio::test]
async fn post_register_password_mismatch_returns_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/auth/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"username":"trader","email":"trader@example.com","password":"123456","rePassword":"654321"}"#,
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Passwords do not match."));
}

#[tokio::test]
async fn post_register_short_password_returns_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/auth/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"username":"trader","email":"trader@example.com","password":"123","rePassword":"123"}"#,
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("at least 6 characters"));
}
