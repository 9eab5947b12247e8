use axum::{
    Router,
    http::{Request, StatusCode, header},
    routing::{delete, get, post},
};
use http_body_util::BodyExt;
use mongodb::{Client, bson::oid::ObjectId};
use tower::ServiceExt;

use marketpulse::controllers::{indices_controller, thresholds_controller};
use marketpulse::models::CurrentUser;
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

fn current_user() -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        email: "trader@example.com".to_string(),
        username: Some("trader".to_string()),
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn post_create_threshold_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds", post(thresholds_controller::post_create_threshold))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/thresholds")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"ticker":"AAPL","target":150.0,"condition":"above"}"#,
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = response_body_string(res).await;
    assert!(body.to_lowercase().contains("unauthorized"));
}

#[tokio::test]
async fn post_create_threshold_rejects_unknown_condition() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds", post(thresholds_controller::post_create_threshold))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/thresholds")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"ticker":"AAPL","target":150.0,"condition":"equals"}"#,
        ))
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Condition must be"));
}

#[tokio::test]
async fn post_create_threshold_rejects_negative_target() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds", post(thresholds_controller::post_create_threshold))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/thresholds")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"ticker":"AAPL","target":-5.0,"condition":"below"}"#,
        ))
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("non-negative"));
}

#[tokio::test]
async fn post_create_threshold_rejects_blank_ticker() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds", post(thresholds_controller::post_create_threshold))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/thresholds")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            r#"{"ticker":"   ","target":150.0,"condition":"above"}"#,
        ))
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Ticker is required."));
}

#[tokio::test]
async fn get_thresholds_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds", get(thresholds_controller::get_thresholds))
        .with_state(state);

    let req = Request::builder()
        .method("GET")
        .uri("/thresholds")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_threshold_bad_id_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route("/thresholds/:id", delete(thresholds_controller::delete_threshold))
        .with_state(state);

    let mut req = Request::builder()
        .method("DELETE")
        .uri("/thresholds/not-an-object-id")
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("bad id"));
}

#[tokio::test]
async fn get_chart_without_date_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route("/indices/:symbol/chart", get(indices_controller::get_chart))
        .with_state(state);

    let mut req = Request::builder()
        .method("GET")
        .uri("/indices/AAPL/chart")
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("date"));
}

#[tokio::test]
async fn get_chart_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/indices/:symbol/chart", get(indices_controller::get_chart))
        .with_state(state);

    let req = Request::builder()
        .method("GET")
        .uri("/indices/AAPL/chart?date=2024-01-05")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
