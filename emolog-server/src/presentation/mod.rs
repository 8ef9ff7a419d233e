use std::sync::Arc;

use crate::application::diary_service::DiaryService;
use crate::application::stats_service::StatsService;
use crate::application::timelapse_service::TimelapseService;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::storage::supabase::SupabaseStorage;
use crate::infrastructure::ffmpeg::FfmpegEncoder;

pub(crate) mod app_error;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type AppTimelapseService =
    TimelapseService<PostgresPostRepository, SupabaseStorage, FfmpegEncoder>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_service: Arc<StatsService<PostgresPostRepository>>,
    pub(crate) diary_service: Arc<DiaryService<PostgresPostRepository>>,
    pub(crate) timelapse_service: Arc<AppTimelapseService>,
}

impl AppState {
    pub(crate) fn new(
        stats_service: Arc<StatsService<PostgresPostRepository>>,
        diary_service: Arc<DiaryService<PostgresPostRepository>>,
        timelapse_service: Arc<AppTimelapseService>,
    ) -> Self {
        Self {
            stats_service,
            diary_service,
            timelapse_service,
        }
    }
}
