use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{AppState, controllers::thresholds_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/thresholds", post(thresholds_controller::post_create_threshold))
        .route("/thresholds", get(thresholds_controller::get_thresholds))
        .route("/thresholds/:id", delete(thresholds_controller::delete_threshold))
}
