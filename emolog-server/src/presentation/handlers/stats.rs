use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::streak::StreakResult;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::ApiQuery;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct UserQuery {
    /// Owner of the posts.
    pub(crate) user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserStatsDto {
    /// Number of stored posts.
    pub(crate) post_count: u64,
    /// Consecutive local days with at least one post, ending today or yesterday.
    pub(crate) streak_days: u32,
}

impl From<StreakResult> for UserStatsDto {
    fn from(result: StreakResult) -> Self {
        Self {
            post_count: result.post_count,
            streak_days: result.streak_days,
        }
    }
}

#[utoipa::path(
    get,
    path = "/user-stats",
    tag = "stats",
    params(UserQuery),
    responses(
        (status = 200, description = "Post count and current streak", body = UserStatsDto),
        (status = 400, description = "Missing or malformed user_id"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn user_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<(StatusCode, Json<UserStatsDto>)> {
    let stats = state.stats_service.user_stats(query.user_id).await?;

    Ok((StatusCode::OK, Json(UserStatsDto::from(stats))))
}
