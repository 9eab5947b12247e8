use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use mongodb::bson::doc;
use serde_json::json;

use crate::AppState;

pub async fn index() -> impl IntoResponse {
    Json(json!({ "service": "marketpulse", "status": "ok" }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "mongo": "ok" }))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("mongo error: {e}") })),
        )
            .into_response(),
    }
}
