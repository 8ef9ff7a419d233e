use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::diary_service::DiaryEntry;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::ApiQuery;
use crate::presentation::handlers::stats::UserQuery;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DiaryEntryDto {
    pub(crate) id: i64,
    /// Local calendar day of the post, `null` if its timestamp is unreadable.
    pub(crate) date: Option<NaiveDate>,
    pub(crate) url: String,
    pub(crate) emotion: String,
    pub(crate) ai_comment: String,
    pub(crate) user_caption: Option<String>,
}

impl From<DiaryEntry> for DiaryEntryDto {
    fn from(entry: DiaryEntry) -> Self {
        let post = entry.post;
        Self {
            id: post.id,
            date: entry.date,
            url: post.image_url,
            emotion: post.emotion,
            ai_comment: post.ai_comment,
            user_caption: post.user_caption,
        }
    }
}

#[utoipa::path(
    get,
    path = "/photos",
    tag = "diaries",
    params(UserQuery),
    responses(
        (status = 200, description = "Posts newest first", body = [DiaryEntryDto]),
        (status = 400, description = "Missing or malformed user_id"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_photos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<(StatusCode, Json<Vec<DiaryEntryDto>>)> {
    let entries = state.diary_service.list_diary(query.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(entries.into_iter().map(DiaryEntryDto::from).collect()),
    ))
}
