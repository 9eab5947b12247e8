use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
    AppState,
    models::CurrentUser,
    services::twelvedata::{CandleSeries, Interval},
};

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, Response> {
    let Some(raw) = raw else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "query parameter `date` is required (YYYY-MM-DD)" })),
        )
            .into_response());
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid `date`, expected YYYY-MM-DD" })),
        )
            .into_response()
    })
}

#[derive(Deserialize)]
pub struct TickersQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

// GET /indices/tickers?search=SP&limit=10
pub async fn get_tickers(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<TickersQuery>,
) -> Response {
    if user.is_none() {
        return unauthorized();
    }

    let search = q.search.unwrap_or_default();
    let limit = q.limit.unwrap_or(10).min(50);

    match state.polygon.search_tickers(search.trim(), limit).await {
        Ok(results) => (StatusCode::OK, Json(json!({ "tickers": results }))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct ChartQuery {
    pub date: Option<String>,
    pub interval: Option<String>,
}

// GET /indices/:symbol/chart?date=YYYY-MM-DD&interval=5min
pub async fn get_chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<ChartQuery>,
) -> Response {
    if user.is_none() {
        return unauthorized();
    }

    let date = match parse_date(q.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    // unknown intervals fall back rather than failing the request
    let interval = q
        .interval
        .as_deref()
        .and_then(Interval::parse)
        .unwrap_or(Interval::Hour1);

    match state.twelvedata.time_series(&symbol, date, interval).await {
        Ok(series) => (StatusCode::OK, Json(series)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e })),
        )
            .into_response(),
    }
}

// GET /indices/:symbol/details?date=YYYY-MM-DD&interval=5min
pub async fn get_details(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<ChartQuery>,
) -> Response {
    if user.is_none() {
        return unauthorized();
    }

    let date = match parse_date(q.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    let interval = q
        .interval
        .as_deref()
        .and_then(Interval::parse)
        .unwrap_or(Interval::Hour1);

    // both upstreams at once; either may degrade independently
    let (overview, chart) = tokio::join!(
        state.polygon.ticker_overview(&symbol),
        state.twelvedata.time_series(&symbol, date, interval),
    );

    let overview = match overview {
        Ok(o) => serde_json::to_value(o).unwrap_or(serde_json::Value::Null),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "overview lookup failed");
            serde_json::Value::Null
        }
    };

    let chart = match chart {
        Ok(series) => series,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "chart lookup failed");
            CandleSeries::no_data()
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "overview": overview, "chart": chart })),
    )
        .into_response()
}
