use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::diary_service::DiaryService;
use application::stats_service::StatsService;
use application::timelapse_service::{TimelapseBuckets, TimelapseService};
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::storage::supabase::SupabaseStorage;
use domain::slideshow::VideoProfile;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::ffmpeg::FfmpegEncoder;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    if dotenvy::from_filename(".env.local").is_err() {
        dotenvy::dotenv().ok();
    }
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;

    let pool = create_pool(&settings.database_url, settings.db_max_connections).await?;
    if settings.run_migrations {
        run_migrations(&pool).await?;
    }

    let post_repo = PostgresPostRepository::new(pool);
    let storage = SupabaseStorage::new(
        &settings.supabase_url,
        &settings.supabase_secret_key,
        Duration::from_secs(settings.storage_request_timeout_secs),
    )
    .context("failed to build storage client")?;
    let encoder = FfmpegEncoder::new(settings.ffmpeg_bin.clone(), settings.encoder_threads);
    let offset = settings.local_utc_offset;

    let stats_service = Arc::new(StatsService::new(post_repo.clone(), offset));
    let diary_service = Arc::new(DiaryService::new(post_repo.clone(), offset));
    let timelapse_service = Arc::new(TimelapseService::new(
        post_repo,
        storage,
        encoder,
        TimelapseBuckets {
            photos: settings.post_photos_bucket.clone(),
            videos: settings.timelapse_bucket.clone(),
        },
        VideoProfile::default(),
        offset,
    ));

    info!(
        offset = %offset,
        photos_bucket = %settings.post_photos_bucket,
        timelapse_bucket = %settings.timelapse_bucket,
        "services ready"
    );

    let state = AppState::new(stats_service, diary_service, timelapse_service);
    server::run_http(&settings, state).await
}
