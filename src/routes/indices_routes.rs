use axum::{Router, routing::get};

use crate::{AppState, controllers::indices_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/indices/tickers", get(indices_controller::get_tickers))
        .route("/indices/:symbol/chart", get(indices_controller::get_chart))
        .route("/indices/:symbol/details", get(indices_controller::get_details))
}
