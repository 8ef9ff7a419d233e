use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::timelapse::TimelapseRequest;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::FormOrJson;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct GenerateTimelapseDto {
    pub(crate) user_id: Uuid,
    #[validate(range(min = 1970, max = 9999))]
    pub(crate) year: i32,
    #[validate(range(min = 1, max = 12))]
    pub(crate) month: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TimelapseResponseDto {
    /// Public URL of the rendered video.
    pub(crate) url: String,
}

impl From<GenerateTimelapseDto> for TimelapseRequest {
    fn from(dto: GenerateTimelapseDto) -> Self {
        Self {
            user_id: dto.user_id,
            year: dto.year,
            month: dto.month,
        }
    }
}

/// Renders the month synchronously; the response arrives once the video is
/// stored. Accepts the fields as a form or as a JSON object.
#[utoipa::path(
    post,
    path = "/generate-timelapse",
    tag = "timelapse",
    request_body(
        content(
            (GenerateTimelapseDto = "application/x-www-form-urlencoded"),
            (GenerateTimelapseDto = "application/json")
        )
    ),
    responses(
        (status = 200, description = "Video rendered and stored", body = TimelapseResponseDto),
        (status = 400, description = "Malformed or invalid fields"),
        (status = 404, description = "No posts in the requested month"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn generate_timelapse(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<GenerateTimelapseDto>,
) -> AppResult<(StatusCode, Json<TimelapseResponseDto>)> {
    payload.validate()?;
    let artifact = state.timelapse_service.generate(payload.into()).await?;

    Ok((
        StatusCode::OK,
        Json(TimelapseResponseDto { url: artifact.url }),
    ))
}
