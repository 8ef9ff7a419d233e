use utoipa::OpenApi;

use crate::presentation::handlers::diaries::DiaryEntryDto;
use crate::presentation::handlers::stats::UserStatsDto;
use crate::presentation::handlers::timelapse::{GenerateTimelapseDto, TimelapseResponseDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::stats::user_stats,
        crate::presentation::handlers::diaries::list_photos,
        crate::presentation::handlers::timelapse::generate_timelapse
    ),
    components(
        schemas(
            UserStatsDto,
            DiaryEntryDto,
            GenerateTimelapseDto,
            TimelapseResponseDto
        )
    ),
    tags(
        (name = "stats", description = "Posting statistics"),
        (name = "diaries", description = "Diary listing"),
        (name = "timelapse", description = "Monthly slideshow rendering")
    )
)]
pub(crate) struct ApiDoc;
