use axum::Router;
use axum::routing::{get, post};

use super::AppState;
use super::handlers::diaries::list_photos;
use super::handlers::stats::user_stats;
use super::handlers::timelapse::generate_timelapse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/user-stats", get(user_stats))
        .route("/photos", get(list_photos))
        .route("/generate-timelapse", post(generate_timelapse))
}
