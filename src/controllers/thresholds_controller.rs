use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    models::{Condition, CurrentUser, Threshold},
};

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

fn field_error(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "errors": { field: message } })),
    )
        .into_response()
}

fn threshold_json(th: &Threshold) -> serde_json::Value {
    json!({
        "id": th.id.to_hex(),
        "ticker": th.ticker,
        "target": th.target,
        "condition": th.condition.as_str(),
        "enabled": th.enabled,
        "created_at": th.created_at,
    })
}

#[derive(Deserialize)]
pub struct CreateThresholdBody {
    pub ticker: String,
    pub target: f64,
    pub condition: String,
}

// POST /thresholds
pub async fn post_create_threshold(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(body): Json<CreateThresholdBody>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    let ticker = body.ticker.trim();
    if ticker.is_empty() {
        return field_error("ticker", "Ticker is required.");
    }

    let Some(condition) = Condition::parse(&body.condition) else {
        return field_error("condition", "Condition must be \"above\" or \"below\".");
    };

    if !body.target.is_finite() || body.target < 0.0 {
        return field_error("target", "Target must be a non-negative number.");
    }

    match state.thresholds.create(u.id, ticker, body.target, condition).await {
        Ok(th) => (StatusCode::CREATED, Json(threshold_json(&th))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}

// GET /thresholds
pub async fn get_thresholds(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    match state.thresholds.list_for_user(u.id).await {
        Ok(items) => {
            let items: Vec<serde_json::Value> = items.iter().map(threshold_json).collect();
            (StatusCode::OK, Json(json!({ "thresholds": items }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}

// DELETE /thresholds/:id
pub async fn delete_threshold(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    let Ok(oid) = ObjectId::parse_str(&id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "bad id" })),
        )
            .into_response();
    };

    match state.thresholds.delete(u.id, oid).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}
